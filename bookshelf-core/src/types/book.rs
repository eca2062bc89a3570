//! The Book record and the drafts used to create and replace it

use super::BookId;
use crate::error::CastError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A stored book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Identifier assigned by the store on creation
    pub id: BookId,

    pub title: String,

    pub author: String,

    /// Free-form publication date, not validated as a calendar date
    pub published_date: String,

    /// Any JSON number, kept exactly as cast
    pub isbn: Number,

    /// Original filename of the uploaded cover, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a draft
    pub fn from_draft(id: BookId, draft: BookDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            published_date: draft.published_date,
            isbn: draft.isbn,
            cover_image: None,
            created_at,
        }
    }

    /// Apply an update in place. `id` and `created_at` are never touched.
    pub fn apply(&mut self, update: BookUpdate) {
        match update {
            BookUpdate::Replace(draft) => {
                self.title = draft.title;
                self.author = draft.author;
                self.published_date = draft.published_date;
                self.isbn = draft.isbn;
            }
            BookUpdate::CoverImage(file_name) => {
                self.cover_image = Some(file_name);
            }
        }
    }
}

/// Client-supplied content of a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: Number,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        published_date: impl Into<String>,
        isbn: impl Into<Number>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_date: published_date.into(),
            isbn: isbn.into(),
        }
    }

    /// Cast a loosely typed document into a draft.
    ///
    /// Text fields accept strings, numbers and booleans. `isbn` accepts any
    /// number, a string holding a finite number, or a boolean (as 1 or 0).
    pub fn from_document(document: &Map<String, Value>) -> Result<Self, CastError> {
        Ok(Self {
            title: cast_text(document, "title")?,
            author: cast_text(document, "author")?,
            published_date: cast_text(document, "published_date")?,
            isbn: cast_isbn(document)?,
        })
    }

    /// First required text field that is empty, if any
    pub fn missing_required(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("published_date", &self.published_date),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

fn field<'a>(document: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, CastError> {
    match document.get(name) {
        None | Some(Value::Null) => Err(CastError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn cast_text(document: &Map<String, Value>, name: &'static str) -> Result<String, CastError> {
    match field(document, name)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(CastError::WrongType {
            field: name,
            expected: "string",
        }),
    }
}

fn cast_isbn(document: &Map<String, Value>) -> Result<Number, CastError> {
    let wrong_type = CastError::WrongType {
        field: "isbn",
        expected: "number",
    };
    match field(document, "isbn")? {
        Value::Number(n) => Ok(n.clone()),
        Value::Bool(b) => Ok(Number::from(u8::from(*b))),
        Value::String(s) => parse_number(s.trim()).ok_or(wrong_type),
        _ => Err(wrong_type),
    }
}

/// Integers stay integers; everything else must be a finite float
fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(u.into());
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Change applied by an update-by-id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookUpdate {
    /// Replace the four content fields
    Replace(BookDraft),

    /// Record the original filename of an uploaded cover
    CoverImage(String),
}
