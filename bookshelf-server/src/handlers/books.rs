//! Book CRUD handlers

use crate::payload::BookPayload;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_core::{Book, BookUpdate};

const BOOK_NOT_FOUND: &str = "Book not found";
const MISSING_ID: &str = "Missing book ID in request parameters";

/// Create a book
pub async fn create_book(
    State(state): State<AppState>,
    payload: BookPayload,
) -> Result<(StatusCode, Json<ApiResponse<Book>>), ApiError> {
    let invalid = ApiError::error(StatusCode::BAD_REQUEST, "Invalid book data provided");

    if !payload.has_required_fields() {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Missing required book data in request body",
        ));
    }

    let draft = payload.to_draft().map_err(|e| {
        tracing::warn!("Rejecting book payload: {}", e);
        invalid
    })?;

    match state.store.create(draft).await {
        Ok(Some(book)) => {
            tracing::info!("Created book {} ({:?})", book.id, book.title);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new("Book was created successfully", book)),
            ))
        }
        Ok(None) => {
            tracing::error!("Store accepted a book but returned no record");
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create book",
            ))
        }
        Err(e) => {
            tracing::warn!("Failed to create book: {}", e);
            Err(invalid)
        }
    }
}

/// List all books
pub async fn list_books(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Book>>>, ApiError> {
    let books = state.store.find_all().await.map_err(|e| {
        tracing::error!("Failed to list books: {}", e);
        ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving books")
    })?;

    if books.is_empty() {
        return Err(ApiError::error(StatusCode::NOT_FOUND, "No books found"));
    }

    Ok(Json(ApiResponse::new("success", books)))
}

/// Get a single book
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::error(StatusCode::BAD_REQUEST, MISSING_ID));
    }

    match state.store.find_by_id(&id).await {
        Ok(Some(book)) => Ok(Json(ApiResponse::new("success", book))),
        Ok(None) => Err(ApiError::error(StatusCode::NOT_FOUND, BOOK_NOT_FOUND)),
        Err(e) => {
            tracing::warn!("Failed to retrieve book {}: {}", id, e);
            Err(ApiError::error(
                StatusCode::BAD_REQUEST,
                "Error retrieving book",
            ))
        }
    }
}

/// Replace a book's content fields
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: BookPayload,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    let failed = ApiError::error(StatusCode::BAD_REQUEST, "Error updating book");

    if id.is_empty() || !payload.has_required_fields() {
        return Err(ApiError::error(
            StatusCode::BAD_REQUEST,
            "Missing required book data or ID in request",
        ));
    }

    let draft = payload.to_draft().map_err(|e| {
        tracing::warn!("Rejecting book payload for {}: {}", id, e);
        failed
    })?;

    match state.store.update_by_id(&id, BookUpdate::Replace(draft)).await {
        Ok(Some(book)) => Ok(Json(ApiResponse::new("Book updated successfully", book))),
        Ok(None) => Err(ApiError::error(StatusCode::NOT_FOUND, BOOK_NOT_FOUND)),
        Err(e) => {
            tracing::warn!("Failed to update book {}: {}", id, e);
            Err(failed)
        }
    }
}

/// Delete a book, returning what was stored
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::error(StatusCode::BAD_REQUEST, MISSING_ID));
    }

    match state.store.delete_by_id(&id).await {
        Ok(Some(book)) => {
            tracing::info!("Deleted book {}", book.id);
            Ok(Json(ApiResponse::new("Book deleted successfully", book)))
        }
        Ok(None) => Err(ApiError::error(StatusCode::NOT_FOUND, BOOK_NOT_FOUND)),
        Err(e) => {
            tracing::error!("Failed to delete book {}: {}", id, e);
            Err(ApiError::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error deleting book",
            ))
        }
    }
}
