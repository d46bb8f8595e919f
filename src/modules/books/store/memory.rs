use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{BookRecord, FieldSet};

/// In-process `BookStore` keeping records in insertion order.
///
/// Used by the `memory` backend and by tests. [`MemoryBookStore::unavailable`]
/// builds a store whose every call fails.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<BookRecord>>,
    unavailable: Option<String>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every operation with `StoreError::Unavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            books: RwLock::default(),
            unavailable: Some(reason.into()),
        }
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> Result<Vec<BookRecord>, StoreError> {
        self.check()?;
        Ok(self.books.read().await.clone())
    }

    async fn find_by_filter(&self, filter: &FieldSet) -> Result<Vec<BookRecord>, StoreError> {
        self.check()?;
        let books = self.books.read().await;
        Ok(books
            .iter()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }

    async fn insert_one(&self, mut record: BookRecord) -> Result<ObjectId, StoreError> {
        self.check()?;
        let id = ObjectId::new();
        record.id = Some(id);
        self.books.write().await.push(record);
        Ok(id)
    }

    async fn update_one(&self, id: ObjectId, fields: &FieldSet) -> Result<u64, StoreError> {
        self.check()?;
        let mut books = self.books.write().await;
        match books.iter_mut().find(|book| book.id == Some(id)) {
            Some(book) => {
                fields.apply_to(book);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError> {
        self.check()?;
        let mut books = self.books.write().await;
        match books.iter().position(|book| book.id == Some(id)) {
            Some(index) => {
                books.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
