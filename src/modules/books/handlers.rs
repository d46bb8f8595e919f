//! JSON request handlers for `/api/books`.
//!
//! Each handler performs exactly one store call. Store failures become a 500
//! with a fixed message per operation; the underlying error is only logged.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_http::error::AppError;
use mongodb::bson::oid::ObjectId;

use super::models::{BookRecord, BookResponse, CreateBook, FieldSet, MessageBody, UpdateBook};
use super::store::SharedStore;

pub const INVALID_BODY: &str = "Invalid request body";
pub const INVALID_ID: &str = "Invalid book ID";
pub const NOT_FOUND: &str = "Book not found";
pub const UPDATED: &str = "Book updated successfully";
pub const DELETED: &str = "Book deleted successfully";

/// `GET /api/books`
pub async fn list_books(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let records = store
        .find_all()
        .await
        .map_err(|err| AppError::internal(err, "Failed to list books"))?;

    Ok(Json(records.into_iter().map(BookResponse::from).collect()))
}

/// `POST /api/books`
pub async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload?;
    tracing::info!(name = %request.name, author = %request.author, "creating book");

    let id = store
        .insert_one(BookRecord::from(request))
        .await
        .map_err(|err| AppError::internal(err, "Failed to add book"))?;

    tracing::info!(id = %id, "book created");
    Ok(StatusCode::OK)
}

/// `PUT /api/books`
///
/// Only fields that differ from their zero value are written, and a missing
/// record is reported with the same success message as an updated one.
pub async fn update_book(
    State(store): State<SharedStore>,
    payload: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(request) = payload?;
    let id = request
        .object_id()
        .ok_or_else(|| AppError::bad_request(INVALID_ID))?;

    let fields = FieldSet::sparse(&request);
    tracing::info!(id = %id, fields = fields.len(), "updating book");

    let matched = store
        .update_one(id, &fields)
        .await
        .map_err(|err| AppError::internal(err, "Failed to update book"))?;

    tracing::info!(id = %id, matched, "book update finished");
    Ok(Json(MessageBody::new(UPDATED)))
}

/// `DELETE /api/books/{id}`
pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    let id = ObjectId::parse_str(&id).map_err(|_| AppError::bad_request(INVALID_ID))?;

    let deleted = store
        .delete_one(id)
        .await
        .map_err(|err| AppError::internal(err, "Failed to delete book"))?;

    if deleted == 0 {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(id = %id, "book deleted");
    Ok(Json(MessageBody::new(DELETED)))
}

/// `GET /api/books/health`
pub async fn health_check(State(store): State<SharedStore>) -> Result<&'static str, AppError> {
    store
        .ping()
        .await
        .map_err(|err| AppError::internal(err, "Books store is unavailable"))?;
    Ok("books module is healthy")
}
