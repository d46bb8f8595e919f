//! Startup seed data.
//!
//! Each seed book is looked up by exact match on every field and inserted
//! only when absent, so seeding is idempotent. More than one match means the
//! collection is already inconsistent and startup is aborted.

use thiserror::Error;

use super::models::{BookRecord, FieldSet};
use super::store::{BookStore, StoreError};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("more records were found: {count} copies of seed book '{name}'")]
    Duplicate { name: String, count: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub existing: usize,
}

fn seed_book(name: &str, author: &str, isbn: &str, pages: i64, year: i64) -> BookRecord {
    BookRecord {
        id: None,
        name: name.to_string(),
        author: author.to_string(),
        isbn: isbn.to_string(),
        pages,
        year,
    }
}

/// The books every fresh collection starts with.
pub fn seed_books() -> Vec<BookRecord> {
    vec![
        seed_book("The Vortex", "José Eustasio Rivera", "958-30-0804-4", 292, 1924),
        seed_book("Frankenstein", "Mary Shelley", "978-3-649-64609-9", 280, 1818),
        seed_book("The Black Cat", "Edgar Allan Poe", "978-3-99168-238-7", 280, 1843),
    ]
}

/// Insert every missing seed book.
pub async fn ensure_seed_data(store: &dyn BookStore) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for book in seed_books() {
        let matches = store.find_by_filter(&FieldSet::exact(&book)).await?;

        match matches.len() {
            0 => {
                let id = store.insert_one(book.clone()).await?;
                tracing::info!(target: "bookshelf::seed", id = %id, name = %book.name, "seed book inserted");
                report.inserted += 1;
            }
            1 => {
                tracing::debug!(target: "bookshelf::seed", name = %book.name, "seed book already present");
                report.existing += 1;
            }
            count => {
                return Err(SeedError::Duplicate {
                    name: book.name,
                    count,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::MemoryBookStore;

    #[tokio::test]
    async fn seeds_empty_store_once() {
        let store = MemoryBookStore::new();

        let first = ensure_seed_data(&store).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                inserted: 3,
                existing: 0
            }
        );

        let second = ensure_seed_data(&store).await.unwrap();
        assert_eq!(
            second,
            SeedReport {
                inserted: 0,
                existing: 3
            }
        );
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn edited_seed_book_is_inserted_again() {
        let store = MemoryBookStore::new();
        ensure_seed_data(&store).await.unwrap();

        let frankenstein = store.find_all().await.unwrap()[1].clone();
        let pages = FieldSet {
            pages: Some(281),
            ..FieldSet::default()
        };
        store
            .update_one(frankenstein.id.unwrap(), &pages)
            .await
            .unwrap();

        let report = ensure_seed_data(&store).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn duplicate_seed_books_abort() {
        let store = MemoryBookStore::new();
        let vortex = seed_books().remove(0);
        store.insert_one(vortex.clone()).await.unwrap();
        store.insert_one(vortex).await.unwrap();

        let err = ensure_seed_data(&store).await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Duplicate { ref name, count: 2 } if name == "The Vortex"
        ));
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let store = MemoryBookStore::unavailable("no primary");
        let err = ensure_seed_data(&store).await.unwrap_err();
        assert!(matches!(err, SeedError::Store(StoreError::Unavailable(_))));
    }
}
