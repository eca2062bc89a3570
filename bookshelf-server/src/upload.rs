//! Multipart file uploads
//!
//! [`parse_upload`] drains a multipart stream into [`UploadedFiles`],
//! enforcing an [`UploadPolicy`] on each file part as it arrives. Parts
//! without a filename are plain form fields and are skipped.

use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Form field carrying a book cover
pub const COVER_IMAGE_FIELD: &str = "cover_image";

/// Content types accepted for a book cover
pub const IMAGE_MIME_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Malformed multipart body: {0}")]
    Malformed(#[from] MultipartError),
}

/// Accepted file field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub max_count: usize,
    /// `None` accepts any content type
    pub allowed_types: Option<&'static [&'static str]>,
}

/// Which file fields a request may carry
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy {
    fields: Vec<FieldRule>,
}

impl UploadPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// A single image under `cover_image`
    pub fn cover_image() -> Self {
        Self::new().field(FieldRule {
            name: COVER_IMAGE_FIELD,
            max_count: 1,
            allowed_types: Some(IMAGE_MIME_TYPES),
        })
    }

    /// Check a file part before its body is read. `already` is how many
    /// files were accepted under the same field so far.
    pub fn check(&self, field: &str, mime_type: &str, already: usize) -> Result<(), UploadError> {
        let rule = self
            .fields
            .iter()
            .find(|r| r.name == field)
            .filter(|r| already < r.max_count)
            .ok_or_else(|| UploadError::UnexpectedField(field.to_string()))?;

        match rule.allowed_types {
            Some(types) if !types.contains(&mime_type) => {
                Err(UploadError::InvalidFileType(mime_type.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// A file received in a multipart request, held in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub data: Bytes,
    pub size: usize,
}

/// Uploaded files grouped by field name
#[derive(Debug, Default)]
pub struct UploadedFiles(HashMap<String, Vec<UploadedFile>>);

impl UploadedFiles {
    pub fn first(&self, field: &str) -> Option<&UploadedFile> {
        self.0.get(field).and_then(|files| files.first())
    }

    pub fn get(&self, field: &str) -> &[UploadedFile] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, file: UploadedFile) {
        self.0.entry(file.field_name.clone()).or_default().push(file);
    }
}

/// Read every part of `multipart`, keeping the file parts `policy` allows
pub async fn parse_upload(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<UploadedFiles, UploadError> {
    let mut files = UploadedFiles::default();

    while let Some(field) = multipart.next_field().await? {
        let original_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        policy.check(&field_name, &mime_type, files.get(&field_name).len())?;

        let data = field.bytes().await?;
        tracing::debug!(
            "Received file {:?} ({}, {} bytes) in field {}",
            original_name,
            mime_type,
            data.len(),
            field_name
        );

        files.push(UploadedFile {
            field_name,
            original_name,
            mime_type,
            size: data.len(),
            data,
        });
    }

    Ok(files)
}
