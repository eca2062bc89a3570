//! Error types for Bookshelf Core

use thiserror::Error;

/// Errors that occur when parsing a document identifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("expected 24 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("non-hex character in {0:?}")]
    InvalidCharacter(String),
}

/// Errors that occur when casting a loosely typed payload into a draft
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CastError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Cannot cast `{field}` to {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid id {0:?}")]
    InvalidId(String),

    #[error("Validation failed: `{0}` is required")]
    Validation(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}
