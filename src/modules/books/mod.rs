pub mod handlers;
pub mod models;
pub mod seed;
pub mod service;
pub mod store;
pub mod views;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    routing::{delete, get, MethodRouter},
    Router,
};
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

pub use service::Service;
use store::SharedStore;
use views::{ViewState, Views};

/// Books module: the `/api/books` endpoints and the HTML pages, limited to
/// what the configured [`Service`] serves.
pub struct BooksModule {
    store: SharedStore,
    service: Service,
    views: Arc<Views>,
}

impl BooksModule {
    pub fn new(store: SharedStore, service: Service) -> anyhow::Result<Self> {
        let views = Views::new().context("failed to compile page templates")?;
        Ok(Self {
            store,
            service,
            views: Arc::new(views),
        })
    }

    pub fn service(&self) -> Service {
        self.service
    }

    fn collection_routes(&self) -> Option<MethodRouter<SharedStore>> {
        let service = self.service;
        let mut route: Option<MethodRouter<SharedStore>> = None;

        if service.serves_list() {
            route = Some(route.unwrap_or_else(MethodRouter::new).get(handlers::list_books));
        }
        if service.serves_create() {
            route = Some(route.unwrap_or_else(MethodRouter::new).post(handlers::create_book));
        }
        if service.serves_update() {
            route = Some(route.unwrap_or_else(MethodRouter::new).put(handlers::update_book));
        }

        route
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            service = %self.service,
            environment = ?ctx.settings.environment,
            "books module initialized"
        );

        if self.service.seeds_on_start() && ctx.settings.database.seed {
            let report = seed::ensure_seed_data(self.store.as_ref())
                .await
                .context("failed to seed the books collection")?;
            tracing::info!(
                module = self.name(),
                inserted = report.inserted,
                existing = report.existing,
                "seed data checked"
            );
        }

        Ok(())
    }

    fn routes(&self) -> Router {
        let mut router = Router::new().route("/health", get(handlers::health_check));

        if let Some(collection) = self.collection_routes() {
            router = router.route("/", collection);
        }
        if self.service.serves_delete() {
            router = router.route("/{id}", delete(handlers::delete_book));
        }

        router.with_state(self.store.clone())
    }

    fn views(&self) -> Router {
        if !self.service.serves_views() {
            return Router::new();
        }

        let state = ViewState {
            store: self.store.clone(),
            views: self.views.clone(),
        };

        Router::new()
            .route("/", get(views::index))
            .route("/books", get(views::book_table))
            .route("/authors", get(views::authors))
            .route("/years", get(views::years))
            .route("/search", get(views::search_bar))
            .route("/create", get(views::create_form))
            .with_state(state)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let message_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Message" }
                    }
                }
            })
        };

        let mut collection = serde_json::Map::new();
        if self.service.serves_list() {
            collection.insert(
                "get".to_string(),
                json!({
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "All books in store order",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Store failure")
                    }
                }),
            );
        }
        if self.service.serves_create() {
            collection.insert(
                "post".to_string(),
                json!({
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateBook" }
                            }
                        }
                    },
                    "responses": {
                        "200": { "description": "Created; the body is empty" },
                        "400": error_response("Malformed body"),
                        "500": error_response("Store failure")
                    }
                }),
            );
        }
        if self.service.serves_update() {
            collection.insert(
                "put".to_string(),
                json!({
                    "summary": "Update a book",
                    "description": "Fields left at their zero value (empty string, 0) are not changed.",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/UpdateBook" }
                            }
                        }
                    },
                    "responses": {
                        "200": message_response("Update applied, or no book had that id"),
                        "400": error_response("Malformed body or missing id"),
                        "500": error_response("Store failure")
                    }
                }),
            );
        }

        let mut paths = serde_json::Map::new();
        paths.insert(
            "/health".to_string(),
            json!({
                "get": {
                    "summary": "Books store health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        },
                        "500": error_response("Store unreachable")
                    }
                }
            }),
        );
        if !collection.is_empty() {
            paths.insert("/".to_string(), serde_json::Value::Object(collection));
        }
        if self.service.serves_delete() {
            paths.insert(
                "/{id}".to_string(),
                json!({
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }
                        }],
                        "responses": {
                            "200": message_response("Book deleted"),
                            "400": error_response("Invalid id format"),
                            "404": error_response("No book with that id"),
                            "500": error_response("Store failure")
                        }
                    }
                }),
            );
        }

        let book_fields = json!({
            "name": { "type": "string" },
            "author": { "type": "string" },
            "isbn": { "type": "string" },
            "pages": { "type": "integer", "format": "int64" },
            "year": { "type": "integer", "format": "int64" }
        });
        let mut book = book_fields.clone();
        book["id"] = json!({ "type": "string", "description": "Hex object id" });
        let mut update = book.clone();
        update["id"] = json!({ "type": "string", "description": "Hex object id of the book to change" });

        Some(json!({
            "paths": paths,
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book,
                        "required": ["id", "name", "author", "pages", "year"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": book_fields
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": update,
                        "required": ["id"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), service = %self.service, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: SharedStore, service: Service) -> anyhow::Result<Arc<dyn Module>> {
    Ok(Arc::new(BooksModule::new(store, service)?))
}
