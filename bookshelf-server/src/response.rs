//! JSON response bodies shared by the handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success body: `{"message": ..., "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

/// Error body, keyed either `error` or `message`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBody {
    Error(&'static str),
    Message(&'static str),
}

/// A handler failure that has already been mapped to a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// `{"error": text}`
    pub fn error(status: StatusCode, text: &'static str) -> Self {
        Self {
            status,
            body: ErrorBody::Error(text),
        }
    }

    /// `{"message": text}`
    pub fn message(status: StatusCode, text: &'static str) -> Self {
        Self {
            status,
            body: ErrorBody::Message(text),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
