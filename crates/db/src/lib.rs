//! MongoDB client factory.
//!
//! Connecting is bounded by `database.connect_timeout_ms`: option parsing,
//! client construction and the initial `ping` all share that one deadline.
//! Request handling never goes through this timeout.

use std::time::Duration;

use anyhow::{anyhow, Context};
use bookshelf_kernel::settings::DatabaseSettings;
use mongodb::{bson::doc, options::ClientOptions, Client, Collection, Database};

const APP_NAME: &str = "bookshelf";

/// A live client plus the configured database handle.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database: Database,
}

impl Connection {
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Return a typed handle to `name`, creating the collection when it does
    /// not exist yet.
    pub async fn prepare_collection<T>(&self, name: &str) -> anyhow::Result<Collection<T>>
    where
        T: Send + Sync,
    {
        let names = self
            .database
            .list_collection_names(None)
            .await
            .context("failed to list collections")?;

        if !names.iter().any(|existing| existing == name) {
            tracing::info!(
                target: "bookshelf-db",
                database = %self.database.name(),
                collection = name,
                "creating collection"
            );
            self.database
                .create_collection(name, None)
                .await
                .with_context(|| format!("failed to create collection '{name}'"))?;
        }

        Ok(self.database.collection::<T>(name))
    }

    /// Close pooled connections and wait for in-flight operations to finish.
    pub async fn shutdown(self) {
        tracing::info!(target: "bookshelf-db", "closing MongoDB client");
        self.client.shutdown().await;
    }
}

/// Connect to `uri` and verify the primary answers a `ping` before returning.
pub async fn connect(uri: &str, settings: &DatabaseSettings) -> anyhow::Result<Connection> {
    let deadline = Duration::from_millis(settings.connect_timeout_ms);

    tracing::info!(
        target: "bookshelf-db",
        database = %settings.name,
        timeout_ms = settings.connect_timeout_ms,
        "connecting to MongoDB"
    );

    tokio::time::timeout(deadline, establish(uri, settings, deadline))
        .await
        .map_err(|_| {
            anyhow!(
                "timed out after {}ms connecting to MongoDB",
                settings.connect_timeout_ms
            )
        })?
}

async fn establish(
    uri: &str,
    settings: &DatabaseSettings,
    deadline: Duration,
) -> anyhow::Result<Connection> {
    let mut options = ClientOptions::parse(uri)
        .await
        .context("failed to create client for MongoDB")?;
    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(deadline);
    options.connect_timeout = Some(deadline);

    let client = Client::with_options(options).context("failed to create client for MongoDB")?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 }, None)
        .await
        .context("failed to connect to MongoDB, please make sure the database is running")?;

    tracing::info!(target: "bookshelf-db", database = %settings.name, "MongoDB ping succeeded");

    Ok(Connection { client, database })
}
