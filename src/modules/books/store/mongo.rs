use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};

use super::{BookStore, StoreError};
use crate::modules::books::models::{BookRecord, FieldSet};

/// `BookStore` backed by a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoBookStore {
    database: Database,
    collection: Collection<BookRecord>,
}

impl MongoBookStore {
    pub fn new(database: Database, collection: Collection<BookRecord>) -> Self {
        Self {
            database,
            collection,
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn find_all(&self) -> Result<Vec<BookRecord>, StoreError> {
        let cursor = self.collection.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_filter(&self, filter: &FieldSet) -> Result<Vec<BookRecord>, StoreError> {
        let cursor = self.collection.find(filter.to_document(), None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_one(&self, record: BookRecord) -> Result<ObjectId, StoreError> {
        let result = self.collection.insert_one(&record, None).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingInsertedId)?;

        tracing::debug!(target: "bookshelf::books", id = %id, "book inserted");
        Ok(id)
    }

    async fn update_one(&self, id: ObjectId, fields: &FieldSet) -> Result<u64, StoreError> {
        let filter = doc! { "_id": id };

        // MongoDB rejects an empty `$set`; report the match without writing.
        if fields.is_empty() {
            return Ok(self.collection.count_documents(filter, None).await?);
        }

        let update = doc! { "$set": fields.to_document() };
        let result = self.collection.update_one(filter, update, None).await?;

        tracing::debug!(
            target: "bookshelf::books",
            id = %id,
            matched = result.matched_count,
            modified = result.modified_count,
            "book updated"
        );
        Ok(result.matched_count)
    }

    async fn delete_one(&self, id: ObjectId) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
