//! Persistence port for books and its document-store backends

mod collection;
mod json;
mod memory;

pub use collection::Collection;
pub use json::JsonFileBookStore;
pub use memory::MemoryBookStore;

use crate::error::StoreError;
use crate::types::{Book, BookDraft, BookUpdate};
use async_trait::async_trait;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Narrow persistence port used by the request handlers.
///
/// Identifiers are passed through as raw strings; backends report a
/// malformed one as [`StoreError::InvalidId`].
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book.
    ///
    /// `Ok(None)` means the backend accepted the write but did not hand the
    /// stored document back.
    async fn create(&self, draft: BookDraft) -> StoreResult<Option<Book>>;

    /// All books in insertion order
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Apply `update` and return the record as it is after the update
    async fn update_by_id(&self, id: &str, update: BookUpdate) -> StoreResult<Option<Book>>;

    /// Remove a book and return what was stored
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>>;
}
