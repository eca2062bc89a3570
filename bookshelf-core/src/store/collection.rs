//! In-memory document collection shared by the store backends

use super::StoreResult;
use crate::error::StoreError;
use crate::types::{Book, BookDraft, BookId, BookUpdate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Books in insertion order
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Collection {
    books: Vec<Book>,
}

fn parse_id(id: &str) -> StoreResult<BookId> {
    id.parse()
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn validate(draft: &BookDraft) -> StoreResult<()> {
    match draft.missing_required() {
        Some(field) => Err(StoreError::Validation(field)),
        None => Ok(()),
    }
}

impl Collection {
    /// Load a collection from a JSON file
    pub async fn load(path: &Path) -> StoreResult<Self> {
        // Read file directly, handle NotFound as empty collection
        match tokio::fs::read_to_string(path).await {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save the collection to a JSON file atomically
    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(self)?;

        // Same directory keeps the rename on one filesystem
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &data).await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Assign an id and creation time to `draft` and append it
    pub fn insert(&mut self, draft: BookDraft) -> StoreResult<Book> {
        validate(&draft)?;
        let book = Book::from_draft(BookId::generate(), draft, chrono::Utc::now());
        self.books.push(book.clone());
        Ok(book)
    }

    pub fn all(&self) -> Vec<Book> {
        self.books.clone()
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        Ok(self.books.iter().find(|b| b.id == id).cloned())
    }

    pub fn update(&mut self, id: &str, update: BookUpdate) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        if let BookUpdate::Replace(draft) = &update {
            validate(draft)?;
        }
        Ok(self.books.iter_mut().find(|b| b.id == id).map(|book| {
            book.apply(update);
            book.clone()
        }))
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        Ok(self
            .books
            .iter()
            .position(|b| b.id == id)
            .map(|index| self.books.remove(index)))
    }
}
