use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Field names of a stored book document.
pub mod fields {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const AUTHOR: &str = "author";
    pub const ISBN: &str = "isbn";
    pub const PAGES: &str = "pages";
    pub const YEAR: &str = "year";
}

/// A book as stored in the `information` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Assigned by the store on insert, never changed afterwards
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    /// Empty when the book has no ISBN
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub year: i64,
}

/// Request model for creating a new book.
///
/// Missing fields take their zero value; nothing beyond the JSON shape is
/// validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub year: i64,
}

impl From<CreateBook> for BookRecord {
    fn from(request: CreateBook) -> Self {
        Self {
            id: None,
            name: request.name,
            author: request.author,
            isbn: request.isbn,
            pages: request.pages,
            year: request.year,
        }
    }
}

/// Request model for `PUT /api/books`: the full record including its id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    #[serde(default, alias = "ID")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub year: i64,
}

impl UpdateBook {
    /// The target id, or `None` when it is absent, malformed, or all zeroes.
    pub fn object_id(&self) -> Option<ObjectId> {
        self.id
            .as_deref()
            .and_then(|hex| ObjectId::parse_str(hex).ok())
            .filter(|id| id.bytes() != [0u8; 12])
    }
}

/// Response model for a single book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    /// Lowercase hex form of the stored id
    pub id: String,
    pub name: String,
    pub author: String,
    pub pages: i64,
    pub year: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub isbn: String,
}

impl From<BookRecord> for BookResponse {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: record.name,
            author: record.author,
            pages: record.pages,
            year: record.year,
            isbn: record.isbn,
        }
    }
}

/// Body of the update and delete success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A set of named field values, used both as an exact-match filter and as
/// the replacement set of an update. `None` means the field is not named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub name: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub pages: Option<i64>,
    pub year: Option<i64>,
}

impl FieldSet {
    /// Name every non-id field of `record`.
    pub fn exact(record: &BookRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            author: Some(record.author.clone()),
            isbn: Some(record.isbn.clone()),
            pages: Some(record.pages),
            year: Some(record.year),
        }
    }

    /// Sparse merge: a field is named only when it differs from its zero
    /// value. An update can therefore never set `pages`/`year` to 0 or clear
    /// `name`, `author` or `isbn`.
    pub fn sparse(request: &UpdateBook) -> Self {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }
        fn non_zero(value: i64) -> Option<i64> {
            (value != 0).then_some(value)
        }

        Self {
            name: non_empty(&request.name),
            author: non_empty(&request.author),
            isbn: non_empty(&request.isbn),
            pages: non_zero(request.pages),
            year: non_zero(request.year),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of named fields
    pub fn len(&self) -> usize {
        [
            self.name.is_some(),
            self.author.is_some(),
            self.isbn.is_some(),
            self.pages.is_some(),
            self.year.is_some(),
        ]
        .into_iter()
        .filter(|named| *named)
        .count()
    }

    /// True when every named field equals the record's value.
    pub fn matches(&self, record: &BookRecord) -> bool {
        self.name.as_ref().map_or(true, |v| *v == record.name)
            && self.author.as_ref().map_or(true, |v| *v == record.author)
            && self.isbn.as_ref().map_or(true, |v| *v == record.isbn)
            && self.pages.map_or(true, |v| v == record.pages)
            && self.year.map_or(true, |v| v == record.year)
    }

    /// Overwrite the named fields of `record`.
    pub fn apply_to(&self, record: &mut BookRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(author) = &self.author {
            record.author = author.clone();
        }
        if let Some(isbn) = &self.isbn {
            record.isbn = isbn.clone();
        }
        if let Some(pages) = self.pages {
            record.pages = pages;
        }
        if let Some(year) = self.year {
            record.year = year;
        }
    }

    /// BSON form, usable as a query filter or as the body of `$set`.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        if let Some(name) = &self.name {
            document.insert(fields::NAME, name.as_str());
        }
        if let Some(author) = &self.author {
            document.insert(fields::AUTHOR, author.as_str());
        }
        if let Some(isbn) = &self.isbn {
            document.insert(fields::ISBN, isbn.as_str());
        }
        if let Some(pages) = self.pages {
            document.insert(fields::PAGES, pages);
        }
        if let Some(year) = self.year {
            document.insert(fields::YEAR, year);
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn dune() -> BookRecord {
        BookRecord {
            id: Some(ObjectId::new()),
            name: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: String::new(),
            pages: 412,
            year: 1965,
        }
    }

    #[test]
    fn response_renders_hex_id_and_omits_empty_isbn() {
        let record = dune();
        let hex = record.id.unwrap().to_hex();

        let json = serde_json::to_value(BookResponse::from(record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": hex,
                "name": "Dune",
                "author": "Herbert",
                "pages": 412,
                "year": 1965
            })
        );
    }

    #[test]
    fn new_record_serializes_without_id() {
        let record = BookRecord::from(CreateBook {
            name: "Dune".to_string(),
            ..CreateBook::default()
        });
        let document = mongodb::bson::to_document(&record).unwrap();
        assert!(!document.contains_key(fields::ID));
        assert_eq!(document.get_str(fields::NAME).unwrap(), "Dune");
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let request: CreateBook = serde_json::from_str(r#"{"name":"Dune","pages":412}"#).unwrap();
        assert_eq!(request.author, "");
        assert_eq!(request.isbn, "");
        assert_eq!(request.year, 0);
    }

    #[test]
    fn update_request_rejects_zero_and_malformed_ids() {
        let zero = UpdateBook {
            id: Some("000000000000000000000000".to_string()),
            ..UpdateBook::default()
        };
        assert!(zero.object_id().is_none());

        let malformed = UpdateBook {
            id: Some("not-hex".to_string()),
            ..UpdateBook::default()
        };
        assert!(malformed.object_id().is_none());

        assert!(UpdateBook::default().object_id().is_none());
    }

    #[test]
    fn update_request_accepts_upper_case_id_key() {
        let id = ObjectId::new();
        let body = format!(r#"{{"ID":"{}","year":2001}}"#, id.to_hex());
        let request: UpdateBook = serde_json::from_str(&body).unwrap();
        assert_eq!(request.object_id(), Some(id));
    }

    #[test]
    fn sparse_drops_zero_values() {
        let request = UpdateBook {
            id: Some(ObjectId::new().to_hex()),
            year: 1966,
            pages: 0,
            author: String::new(),
            ..UpdateBook::default()
        };

        let set = FieldSet::sparse(&request);
        assert_eq!(
            set,
            FieldSet {
                year: Some(1966),
                ..FieldSet::default()
            }
        );
        assert_eq!(set.to_document(), doc! { "year": 1966 });
    }

    #[test]
    fn sparse_of_all_zero_request_is_empty() {
        let set = FieldSet::sparse(&UpdateBook::default());
        assert!(set.is_empty());
        assert!(set.to_document().is_empty());
    }

    #[test]
    fn exact_set_matches_only_identical_records() {
        let record = dune();
        let set = FieldSet::exact(&record);
        assert_eq!(set.len(), 5);
        assert!(set.matches(&record));

        let mut other = record.clone();
        other.pages = 413;
        assert!(!set.matches(&other));
    }

    #[test]
    fn apply_replaces_only_named_fields() {
        let mut record = dune();
        let before = record.clone();
        FieldSet {
            name: Some("Dune Messiah".to_string()),
            ..FieldSet::default()
        }
        .apply_to(&mut record);

        assert_eq!(record.name, "Dune Messiah");
        assert_eq!(record.id, before.id);
        assert_eq!(record.author, before.author);
        assert_eq!(record.pages, before.pages);
        assert_eq!(record.year, before.year);
    }
}
