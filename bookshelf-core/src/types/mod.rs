//! Core types for the book catalogue

mod book;
mod id;

pub use book::{Book, BookDraft, BookUpdate};
pub use id::BookId;
