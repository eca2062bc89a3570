//! Bookshelf Core Library
//!
//! This crate provides the book record, its identifiers, and the storage port
//! the Bookshelf server persists through, together with an in-memory and a
//! JSON-file document store.

pub mod error;
pub mod store;
pub mod types;

pub use error::{CastError, IdError, StoreError};
pub use store::{BookStore, JsonFileBookStore, MemoryBookStore, StoreResult};
pub use types::{Book, BookDraft, BookId, BookUpdate};
