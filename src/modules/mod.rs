pub mod books;

use bookshelf_kernel::ModuleRegistry;

use books::{store::SharedStore, Service};

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: SharedStore,
    service: Service,
) -> anyhow::Result<()> {
    registry.register(books::create_module(store, service)?);
    Ok(())
}
