use std::path::PathBuf;

use anyhow::Context;
use bookshelf_app::{bootstrap, books::Service};
use bookshelf_kernel::settings::{Settings, StoreBackend};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Run and maintain bookshelf services")]
struct Cli {
    /// Directory holding base.toml and {env}.toml
    #[arg(long, global = true, env = "BOOKSHELF_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve one slice of the API (or everything) until Ctrl-C
    Serve {
        /// all, list, create, update, delete or web
        #[arg(long, default_value = "all")]
        service: Service,

        /// Listen port; defaults to the service's own port
        #[arg(long)]
        port: Option<u16>,

        /// Use the in-memory store instead of MongoDB
        #[arg(long)]
        memory: bool,
    },
    /// Insert any missing seed books and exit
    Seed,
    /// Print the resolved configuration and exit
    Config,
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    if let Some(dir) = &cli.config_dir {
        std::env::set_var("BOOKSHELF_CONFIG_DIR", dir);
    }
    Settings::load().with_context(|| "failed to load bookshelf settings")
}

fn describe(settings: &Settings) -> String {
    let uri = match settings.database.backend {
        StoreBackend::Memory => "(in-memory)".to_string(),
        StoreBackend::Mongo => settings
            .database
            .resolve_uri()
            .map(|_| "(set)".to_string())
            .unwrap_or_else(|_| "(missing)".to_string()),
    };

    let mut lines = vec![
        format!("environment        {:?}", settings.environment),
        format!("server.host        {}", settings.server.host),
        format!(
            "server.port        {}",
            settings
                .server
                .port
                .map(|port| port.to_string())
                .unwrap_or_else(|| "(service default)".to_string())
        ),
        format!("server.static_dir  {}", settings.server.static_dir.display()),
        format!("database.backend   {:?}", settings.database.backend),
        format!("database.uri       {uri}"),
        format!("database.name      {}", settings.database.name),
        format!("database.collection {}", settings.database.collection),
        format!("telemetry.format   {:?}", settings.telemetry.log_format),
    ];
    lines.extend(
        Service::ALL
            .iter()
            .map(|service| format!("service.{:<7}    port {}", service.name(), service.default_port())),
    );
    lines.join("\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli)?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve {
            service,
            port,
            memory,
        } => {
            if port.is_some() {
                settings.server.port = port;
            }
            if memory {
                settings.database.backend = StoreBackend::Memory;
            }
            bootstrap::serve(&settings, service).await
        }
        Command::Seed => {
            let report = bootstrap::seed(&settings).await?;
            tracing::info!(
                inserted = report.inserted,
                existing = report.existing,
                "seed complete"
            );
            println!(
                "seed complete: {} inserted, {} already present",
                report.inserted, report.existing
            );
            Ok(())
        }
        Command::Config => {
            println!("{}", describe(&settings));
            Ok(())
        }
    }
}
