//! Process bootstrap: open the configured store, run the module lifecycle and
//! serve one [`Service`] until shutdown.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::Connection;
use bookshelf_kernel::{
    settings::{Settings, StoreBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    books::{
        models::BookRecord,
        seed::{self, SeedReport},
        store::{MemoryBookStore, MongoBookStore, SharedStore},
        Service,
    },
};

/// An opened store plus the client connection that must be closed on exit.
pub struct OpenStore {
    pub store: SharedStore,
    connection: Option<Connection>,
}

impl OpenStore {
    pub async fn close(self) {
        if let Some(connection) = self.connection {
            connection.shutdown().await;
        }
    }
}

/// Open the store selected by `database.backend`.
///
/// The MongoDB backend resolves the connection string, connects and pings
/// within the startup timeout, and creates the collection when missing.
pub async fn open_store(settings: &Settings) -> anyhow::Result<OpenStore> {
    match settings.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on exit");
            Ok(OpenStore {
                store: Arc::new(MemoryBookStore::new()),
                connection: None,
            })
        }
        StoreBackend::Mongo => {
            let uri = settings.database.resolve_uri()?;
            let connection = bookshelf_db::connect(&uri, &settings.database).await?;
            let collection = connection
                .prepare_collection::<BookRecord>(&settings.database.collection)
                .await?;
            let store = MongoBookStore::new(connection.database().clone(), collection);

            Ok(OpenStore {
                store: Arc::new(store),
                connection: Some(connection),
            })
        }
    }
}

/// Port for `service`: `server.port` when configured, the service default otherwise.
pub fn resolve_port(settings: &Settings, service: Service) -> u16 {
    settings
        .server
        .port
        .unwrap_or_else(|| service.default_port())
}

/// Build a registry with every module wired to `store`.
pub fn build_registry(store: SharedStore, service: Service) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, service)?;
    Ok(registry)
}

/// Serve `service` until Ctrl-C.
pub async fn serve(settings: &Settings, service: Service) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        service = %service,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let opened = open_store(settings).await?;
    let registry = build_registry(opened.store.clone(), service)?;
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!(service = %service, "bookshelf bootstrap complete");

    let served =
        bookshelf_http::start_server(&registry, settings, resolve_port(settings, service)).await;

    let stopped = registry.stop_modules().await;
    opened.close().await;

    served?;
    stopped
}

/// Run the duplicate-seed check once against the configured store.
pub async fn seed(settings: &Settings) -> anyhow::Result<SeedReport> {
    let opened = open_store(settings).await?;
    let report = seed::ensure_seed_data(opened.store.as_ref())
        .await
        .context("failed to seed the books collection");
    opened.close().await;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::BookStore;
    use bookshelf_kernel::settings::DatabaseSettings;

    fn memory_settings() -> Settings {
        Settings {
            database: DatabaseSettings {
                backend: StoreBackend::Memory,
                ..DatabaseSettings::default()
            },
            ..Settings::default()
        }
    }

    #[test]
    fn configured_port_overrides_service_default() {
        let mut settings = Settings::default();
        assert_eq!(resolve_port(&settings, Service::Delete), 8083);

        settings.server.port = Some(9000);
        assert_eq!(resolve_port(&settings, Service::Delete), 9000);
    }

    #[tokio::test]
    async fn memory_backend_needs_no_connection_string() {
        let opened = open_store(&memory_settings()).await.unwrap();
        assert!(opened.store.find_all().await.unwrap().is_empty());
        opened.close().await;
    }

    #[tokio::test]
    async fn seed_against_memory_backend_inserts_all_books() {
        let report = seed(&memory_settings()).await.unwrap();
        assert_eq!(report.inserted, 3);
    }

    #[tokio::test]
    async fn mongo_backend_without_uri_fails_before_connecting() {
        let settings = Settings {
            database: DatabaseSettings {
                uri: Some(String::new()),
                ..DatabaseSettings::default()
            },
            ..Settings::default()
        };
        // Only meaningful when the legacy variables are unset in the test environment.
        if std::env::var("MONGO_URI").is_ok() || std::env::var("DATABASE_URI").is_ok() {
            return;
        }
        let err = open_store(&settings).await.err().unwrap();
        assert!(err.to_string().starts_with("failure to load env variable"));
    }

    #[test]
    fn registry_contains_books_module() {
        let registry =
            build_registry(Arc::new(MemoryBookStore::new()), Service::All).unwrap();
        assert!(registry.get_module("books").is_some());
        assert_eq!(registry.module_count(), 1);
    }
}
