//! Server-rendered HTML pages over the books collection.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Html};
use bookshelf_http::error::AppError;
use minijinja::{context, Environment};
use serde::Serialize;

use super::models::{BookRecord, BookResponse};
use super::store::SharedStore;

const TEMPLATES: &[(&str, &str)] = &[
    ("index.html", include_str!("templates/index.html")),
    ("search-bar.html", include_str!("templates/search-bar.html")),
    ("book-table.html", include_str!("templates/book-table.html")),
    ("authors.html", include_str!("templates/authors.html")),
    ("years.html", include_str!("templates/years.html")),
];

/// Compiled page templates.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

/// State shared by the page handlers.
#[derive(Clone)]
pub struct ViewState {
    pub store: SharedStore,
    pub views: Arc<Views>,
}

impl ViewState {
    fn page<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, AppError> {
        self.views
            .render(name, ctx)
            .map(Html)
            .map_err(|err| AppError::internal(err, "Failed to render page"))
    }

    async fn books(&self) -> Result<Vec<BookRecord>, AppError> {
        self.store
            .find_all()
            .await
            .map_err(|err| AppError::internal(err, "Failed to load books"))
    }
}

/// Authors in first-seen order, each listed once.
pub fn distinct_authors(books: &[BookRecord]) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();
    for book in books {
        if !authors.contains(&book.author) {
            authors.push(book.author.clone());
        }
    }
    authors
}

/// Publication years in first-seen order, each listed once.
pub fn distinct_years(books: &[BookRecord]) -> Vec<i64> {
    let mut years = Vec::new();
    for book in books {
        if !years.contains(&book.year) {
            years.push(book.year);
        }
    }
    years
}

/// `GET /`
pub async fn index(State(state): State<ViewState>) -> Result<Html<String>, AppError> {
    state.page("index.html", context! {})
}

/// `GET /books`
pub async fn book_table(State(state): State<ViewState>) -> Result<Html<String>, AppError> {
    let books: Vec<BookResponse> = state
        .books()
        .await?
        .into_iter()
        .map(BookResponse::from)
        .collect();
    state.page("book-table.html", context! { books })
}

/// `GET /authors`
pub async fn authors(State(state): State<ViewState>) -> Result<Html<String>, AppError> {
    let authors = distinct_authors(&state.books().await?);
    state.page("authors.html", context! { authors })
}

/// `GET /years`
pub async fn years(State(state): State<ViewState>) -> Result<Html<String>, AppError> {
    let years = distinct_years(&state.books().await?);
    state.page("years.html", context! { years })
}

/// `GET /search`
pub async fn search_bar(State(state): State<ViewState>) -> Result<Html<String>, AppError> {
    state.page("search-bar.html", context! {})
}

/// `GET /create`; the form posts straight to the API, so there is nothing to render.
pub async fn create_form() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(author: &str, year: i64) -> BookRecord {
        BookRecord {
            id: None,
            name: "Untitled".to_string(),
            author: author.to_string(),
            isbn: String::new(),
            pages: 100,
            year,
        }
    }

    #[test]
    fn all_templates_compile() {
        let views = Views::new().unwrap();
        for &(name, _) in TEMPLATES {
            assert!(views.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn distinct_lists_keep_first_seen_order() {
        let books = vec![
            book("Mary Shelley", 1818),
            book("Edgar Allan Poe", 1843),
            book("Mary Shelley", 1826),
            book("Edgar Allan Poe", 1843),
        ];
        assert_eq!(
            distinct_authors(&books),
            vec!["Mary Shelley".to_string(), "Edgar Allan Poe".to_string()]
        );
        assert_eq!(distinct_years(&books), vec![1818, 1843, 1826]);
    }

    #[test]
    fn book_table_escapes_markup() {
        let views = Views::new().unwrap();
        let books = vec![BookResponse {
            id: "65f0c0ffee0000000000abcd".to_string(),
            name: "<script>alert(1)</script>".to_string(),
            author: "Mallory".to_string(),
            pages: 1,
            year: 2024,
            isbn: String::new(),
        }];
        let html = views
            .render("book-table.html", context! { books })
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("65f0c0ffee0000000000abcd"));
    }

    #[test]
    fn search_bar_only_links_to_served_fragments() {
        let views = Views::new().unwrap();
        let html = views.render("search-bar.html", context! {}).unwrap();
        assert!(!html.contains("<input"));
        for target in ["/books", "/authors", "/years"] {
            assert!(html.contains(&format!("hx-get=\"{target}\"")), "{target}");
        }
    }

    #[test]
    fn years_page_lists_each_year() {
        let views = Views::new().unwrap();
        let html = views
            .render("years.html", context! { years => vec![1818, 1843] })
            .unwrap();
        assert!(html.contains("1818"));
        assert!(html.contains("1843"));
    }
}
