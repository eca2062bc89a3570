//! Request payload for create and update
//!
//! Bodies are kept loosely typed so presence can be checked before the
//! values are cast into a [`BookDraft`].

use crate::response::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    Form,
};
use bookshelf_core::{BookDraft, CastError};
use serde_json::{Map, Value};
use std::collections::HashMap;

const REQUIRED_TEXT_FIELDS: [&str; 3] = ["title", "author", "published_date"];

/// Book fields as sent by the client, from a JSON or urlencoded body
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookPayload(pub Map<String, Value>);

impl BookPayload {
    /// Whether every required field is present and non-empty.
    ///
    /// Text fields must be truthy. A numeric ISBN of zero counts as present.
    pub fn has_required_fields(&self) -> bool {
        REQUIRED_TEXT_FIELDS
            .iter()
            .all(|name| is_truthy(self.0.get(*name)))
            && isbn_present(self.0.get("isbn"))
    }

    /// Cast the payload into a draft
    pub fn to_draft(&self) -> Result<BookDraft, CastError> {
        BookDraft::from_document(&self.0)
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn isbn_present(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        other => is_truthy(other),
    }
}

fn malformed() -> ApiError {
    ApiError::error(StatusCode::BAD_REQUEST, "Malformed request body")
}

#[async_trait]
impl<S> FromRequest<S> for BookPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|_| malformed())?;
            if body.is_empty() {
                return Ok(Self::default());
            }
            return match serde_json::from_slice(&body) {
                Ok(Value::Object(map)) => Ok(Self(map)),
                Ok(_) => Ok(Self::default()),
                Err(e) => {
                    tracing::debug!("Rejecting malformed JSON body: {}", e);
                    Err(malformed())
                }
            };
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|_| malformed())?;
            return Ok(Self(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ));
        }

        // Unreadable or absent body is an empty payload
        Ok(Self::default())
    }
}
