//! Document store gateway for book records.
//!
//! Every operation is one independent call against a single collection; there
//! are no transactions and concurrent writers to the same id race at the
//! store's per-document atomicity (last write wins per field set).

mod memory;
mod mongo;

pub use memory::MemoryBookStore;
pub use mongo::MongoBookStore;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::models::{BookRecord, FieldSet};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("document store failure: {0}")]
    Backend(#[from] mongodb::error::Error),

    #[error("store did not return an object id for the inserted book")]
    MissingInsertedId,

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow CRUD capability over the books collection.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All records in store-native order; an empty collection is `Ok(vec![])`
    async fn find_all(&self) -> Result<Vec<BookRecord>, StoreError>;

    /// Records whose named fields all equal the filter's values
    async fn find_by_filter(&self, filter: &FieldSet) -> Result<Vec<BookRecord>, StoreError>;

    /// Insert a record without an id, returning the id the store assigned
    async fn insert_one(&self, record: BookRecord) -> Result<ObjectId, StoreError>;

    /// Replace the named fields of the record with `id`, returning how many
    /// records matched. An empty field set writes nothing.
    async fn update_one(&self, id: ObjectId, fields: &FieldSet) -> Result<u64, StoreError>;

    /// Delete the record with `id`, returning how many records were removed
    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError>;

    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store handle injected into handlers as axum state.
pub type SharedStore = Arc<dyn BookStore>;
