use anyhow::Context;
use bookshelf_app::{bootstrap, books::Service};
use bookshelf_kernel::settings::Settings;

/// All-in-one server: every API route and page on one port.
/// `bookshelf-cli serve --service <name>` runs a single slice instead.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    bootstrap::serve(&settings, Service::All).await
}
