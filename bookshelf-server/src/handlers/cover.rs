//! Cover image upload

use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::upload::{parse_upload, UploadError, UploadPolicy, UploadedFiles, COVER_IMAGE_FIELD};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use bookshelf_core::{Book, BookId, BookUpdate};

fn internal_error() -> ApiError {
    ApiError::message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Whether the request declares a multipart body, well-formed or not
fn declares_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/"))
        .unwrap_or(false)
}

/// Record the original filename of an uploaded cover on a book
pub async fn update_cover_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::message(StatusCode::BAD_REQUEST, "Invalid request"));
    }
    if !BookId::is_valid(&id) {
        return Err(ApiError::message(StatusCode::BAD_REQUEST, "Invalid book ID"));
    }

    let files = match multipart {
        Ok(multipart) => parse_upload(multipart, &UploadPolicy::cover_image())
            .await
            .map_err(|e| match e {
                UploadError::InvalidFileType(mime) => {
                    tracing::warn!("Rejected cover for {} with type {}", id, mime);
                    internal_error()
                }
                e => {
                    tracing::error!("Failed to read cover upload for {}: {}", id, e);
                    internal_error()
                }
            })?,
        Err(rejection) if declares_multipart(&headers) => {
            tracing::error!("Unreadable multipart header for {}: {}", id, rejection);
            return Err(internal_error());
        }
        // Not a multipart request, so nothing was uploaded
        Err(rejection) => {
            tracing::debug!("No multipart body for {}: {}", id, rejection);
            UploadedFiles::default()
        }
    };

    let file = files
        .first(COVER_IMAGE_FIELD)
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "No file uploaded"))?;

    let update = BookUpdate::CoverImage(file.original_name.clone());
    match state.store.update_by_id(&id, update).await {
        Ok(Some(book)) => {
            tracing::info!("Set cover of {} to {:?}", book.id, file.original_name);
            Ok(Json(ApiResponse::new("Book cover image updated", book)))
        }
        Ok(None) => Err(ApiError::message(StatusCode::NOT_FOUND, "Book not found")),
        Err(e) => {
            tracing::error!("Failed to update cover of {}: {}", id, e);
            Err(internal_error())
        }
    }
}
