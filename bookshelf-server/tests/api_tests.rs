//! Integration tests for the Bookshelf Server API

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bookshelf_core::store::{BookStore, MemoryBookStore, StoreResult};
use bookshelf_core::{Book, BookDraft, BookUpdate, StoreError};
use bookshelf_server::config::Config;
use bookshelf_server::routes::create_router;
use bookshelf_server::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

const MISSING_ID: &str = "507f1f77bcf86cd799439011";

/// Create a test server backed by the given store
fn create_server_with(store: Arc<dyn BookStore>) -> TestServer {
    let app = create_router(AppState::new(store), &Config::default());
    TestServer::new(app).expect("Failed to create test server")
}

/// Create a test server with an empty in-memory store
fn create_test_server() -> TestServer {
    create_server_with(Arc::new(MemoryBookStore::new()))
}

fn sample_book() -> Value {
    json!({
        "title": "T",
        "author": "A",
        "published_date": "2024-01-01",
        "isbn": 123,
    })
}

/// Create a book and return its id
async fn create_book(server: &TestServer, body: &Value) -> String {
    let response = server.post("/books").json(body).await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}

fn cover_form(file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "cover_image",
        Part::bytes(b"\x89PNG fake image".as_slice())
            .file_name(file_name)
            .mime_type(mime_type),
    )
}

/// Store whose every operation fails
struct FailingStore;

#[async_trait]
impl BookStore for FailingStore {
    async fn create(&self, _draft: BookDraft) -> StoreResult<Option<Book>> {
        Err(StoreError::Backend("connection lost".into()))
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Err(StoreError::Backend("connection lost".into()))
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        Err(StoreError::Backend("connection lost".into()))
    }

    async fn update_by_id(&self, _id: &str, _update: BookUpdate) -> StoreResult<Option<Book>> {
        Err(StoreError::Backend("connection lost".into()))
    }

    async fn delete_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        Err(StoreError::Backend("connection lost".into()))
    }
}

/// Store that acknowledges writes without returning the record
struct SilentStore;

#[async_trait]
impl BookStore for SilentStore {
    async fn create(&self, _draft: BookDraft) -> StoreResult<Option<Book>> {
        Ok(None)
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        Ok(None)
    }

    async fn update_by_id(&self, _id: &str, _update: BookUpdate) -> StoreResult<Option<Book>> {
        Ok(None)
    }

    async fn delete_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_book() {
    let server = create_test_server();

    let response = server.post("/books").json(&sample_book()).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Book was created successfully");
    assert_eq!(body["data"]["title"], "T");
    assert_eq!(body["data"]["author"], "A");
    assert_eq!(body["data"]["published_date"], "2024-01-01");
    assert_eq!(body["data"]["isbn"], 123);
    assert_eq!(body["data"]["id"].as_str().unwrap().len(), 24);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"].get("cover_image").is_none());
}

#[tokio::test]
async fn test_create_book_missing_field_persists_nothing() {
    let server = create_test_server();

    for field in ["title", "author", "published_date", "isbn"] {
        let mut book = sample_book();
        book.as_object_mut().unwrap().remove(field);

        let response = server.post("/books").json(&book).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Missing required book data in request body");
    }

    server.get("/books").await.assert_status_not_found();
}

#[tokio::test]
async fn test_create_book_with_zero_isbn() {
    let server = create_test_server();

    let mut book = sample_book();
    book["isbn"] = json!(0);
    let response = server.post("/books").json(&book).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["isbn"], 0);
}

#[tokio::test]
async fn test_create_book_accepts_any_numeric_isbn() {
    let server = create_test_server();

    for (isbn, expected) in [
        (json!(-5), json!(-5)),
        (json!(978.5), json!(978.5)),
        (json!("978.5"), json!(978.5)),
        (json!(true), json!(1)),
    ] {
        let mut book = sample_book();
        book["isbn"] = isbn;
        let response = server.post("/books").json(&book).await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["isbn"], expected);
    }
}

#[tokio::test]
async fn test_create_book_uncastable_isbn() {
    let server = create_test_server();

    let mut book = sample_book();
    book["isbn"] = json!("not-a-number");
    let response = server.post("/books").json(&book).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid book data provided");
}

#[tokio::test]
async fn test_create_book_from_form() {
    let server = create_test_server();

    let response = server
        .post("/books")
        .form(&[
            ("title", "Form Title"),
            ("author", "Form Author"),
            ("published_date", "1999"),
            ("isbn", "42"),
        ])
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Form Title");
    assert_eq!(body["data"]["isbn"], 42);
}

#[tokio::test]
async fn test_create_book_without_body() {
    let server = create_test_server();

    let response = server.post("/books").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing required book data in request body");
}

#[tokio::test]
async fn test_create_book_malformed_json() {
    let server = create_test_server();

    let response = server
        .post("/books")
        .content_type("application/json")
        .bytes("{\"title\":".into())
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Malformed request body");
}

#[tokio::test]
async fn test_create_book_store_returns_nothing() {
    let server = create_server_with(Arc::new(SilentStore));

    let response = server.post("/books").json(&sample_book()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to create book");
}

#[tokio::test]
async fn test_create_book_store_failure_is_client_error() {
    let server = create_server_with(Arc::new(FailingStore));

    let response = server.post("/books").json(&sample_book()).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid book data provided");
}

// =============================================================================
// List and get
// =============================================================================

#[tokio::test]
async fn test_list_books_empty() {
    let server = create_test_server();

    let response = server.get("/books").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "No books found");
}

#[tokio::test]
async fn test_list_books_returns_stored_records() {
    let server = create_test_server();

    let first = create_book(&server, &sample_book()).await;
    let mut second_book = sample_book();
    second_book["title"] = json!("Second");
    let second = create_book(&server, &second_book).await;

    let response = server.get("/books").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "success");
    let books = body["data"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["id"], first.as_str());
    assert_eq!(books[1]["id"], second.as_str());
    assert_eq!(books[1]["title"], "Second");
}

#[tokio::test]
async fn test_list_books_store_failure() {
    let server = create_server_with(Arc::new(FailingStore));

    let response = server.get("/books").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Error retrieving books");
}

#[tokio::test]
async fn test_get_book() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server.get(&format!("/books/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["title"], "T");
}

#[tokio::test]
async fn test_get_book_not_found() {
    let server = create_test_server();

    let response = server.get(&format!("/books/{}", MISSING_ID)).await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Book not found" }));
}

#[tokio::test]
async fn test_get_book_malformed_id() {
    let server = create_test_server();

    let response = server.get("/books/invalid-id").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Error retrieving book");
}

#[tokio::test]
async fn test_get_book_store_failure_is_client_error() {
    let server = create_server_with(Arc::new(FailingStore));

    let response = server.get(&format!("/books/{}", MISSING_ID)).await;

    response.assert_status_bad_request();
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_book() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;
    let created: Value = server.get(&format!("/books/{}", id)).await.json();

    let response = server
        .put(&format!("/books/{}", id))
        .json(&json!({
            "title": "New Title",
            "author": "New Author",
            "published_date": "2025-02-02",
            "isbn": 456,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["data"]["title"], "New Title");

    let fetched: Value = server.get(&format!("/books/{}", id)).await.json();
    assert_eq!(fetched["data"]["title"], "New Title");
    assert_eq!(fetched["data"]["author"], "New Author");
    assert_eq!(fetched["data"]["published_date"], "2025-02-02");
    assert_eq!(fetched["data"]["isbn"], 456);
    assert_eq!(fetched["data"]["createdAt"], created["data"]["createdAt"]);
}

#[tokio::test]
async fn test_update_book_not_found() {
    let server = create_test_server();

    let response = server
        .put(&format!("/books/{}", MISSING_ID))
        .json(&sample_book())
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn test_update_book_partial_payload_rejected() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server
        .put(&format!("/books/{}", id))
        .json(&json!({ "title": "Only Title" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing required book data or ID in request");

    let fetched: Value = server.get(&format!("/books/{}", id)).await.json();
    assert_eq!(fetched["data"]["title"], "T");
}

#[tokio::test]
async fn test_update_book_empty_field_rejected() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let mut book = sample_book();
    book["title"] = json!("");
    let response = server.put(&format!("/books/{}", id)).json(&book).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing required book data or ID in request");

    let fetched: Value = server.get(&format!("/books/{}", id)).await.json();
    assert_eq!(fetched["data"]["title"], "T");
}

#[tokio::test]
async fn test_update_book_store_failure_is_client_error() {
    let server = create_server_with(Arc::new(FailingStore));

    let response = server
        .put(&format!("/books/{}", MISSING_ID))
        .json(&sample_book())
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Error updating book");
}

#[tokio::test]
async fn test_update_book_malformed_id() {
    let server = create_test_server();

    let response = server
        .put("/books/invalid-id")
        .json(&sample_book())
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Error updating book");
}

#[tokio::test]
async fn test_update_book_keeps_cover_image() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    server
        .patch(&format!("/books/cover-image/{}", id))
        .multipart(cover_form("cover.png", "image/png"))
        .await
        .assert_status_ok();

    let response = server
        .put(&format!("/books/{}", id))
        .json(&sample_book())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["cover_image"], "cover.png");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_book_twice() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server.delete(&format!("/books/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Book deleted successfully");
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["title"], "T");

    let response = server.delete(&format!("/books/{}", id)).await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn test_delete_book_malformed_id_is_server_error() {
    let server = create_test_server();

    let response = server.delete("/books/not-an-id").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Error deleting book");
}

// =============================================================================
// Cover image
// =============================================================================

#[tokio::test]
async fn test_update_cover_image() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server
        .patch(&format!("/books/cover-image/{}", id))
        .multipart(cover_form("my cover.jpg", "image/jpeg"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Book cover image updated");
    assert_eq!(body["data"]["cover_image"], "my cover.jpg");
    assert_eq!(body["data"]["title"], "T");

    let fetched: Value = server.get(&format!("/books/{}", id)).await.json();
    assert_eq!(fetched["data"]["cover_image"], "my cover.jpg");
}

#[tokio::test]
async fn test_update_cover_image_invalid_id() {
    let server = create_test_server();

    let response = server
        .patch("/books/cover-image/invalid-id")
        .multipart(cover_form("cover.jpg", "image/jpeg"))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Invalid book ID" }));
}

#[tokio::test]
async fn test_update_cover_image_rejects_non_image() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server
        .patch(&format!("/books/cover-image/{}", id))
        .multipart(cover_form("notes.pdf", "application/pdf"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Internal server error" }));

    let fetched: Value = server.get(&format!("/books/{}", id)).await.json();
    assert!(fetched["data"].get("cover_image").is_none());
}

#[tokio::test]
async fn test_update_cover_image_no_file() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let form = MultipartForm::new().add_text("caption", "no file here");
    let response = server
        .patch(&format!("/books/cover-image/{}", id))
        .multipart(form)
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn test_update_cover_image_not_multipart() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server.patch(&format!("/books/cover-image/{}", id)).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn test_update_cover_image_multipart_without_boundary() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let response = server
        .patch(&format!("/books/cover-image/{}", id))
        .content_type("multipart/form-data")
        .bytes("cover_image".into())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_update_cover_image_unexpected_field() {
    let server = create_test_server();
    let id = create_book(&server, &sample_book()).await;

    let form = MultipartForm::new().add_part(
        "avatar",
        Part::bytes(b"data".as_slice())
            .file_name("avatar.png")
            .mime_type("image/png"),
    );
    let response = server
        .patch(&format!("/books/cover-image/{}", id))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_update_cover_image_book_not_found() {
    let server = create_test_server();

    let response = server
        .patch(&format!("/books/cover-image/{}", MISSING_ID))
        .multipart(cover_form("cover.png", "image/png"))
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn test_update_cover_image_store_failure() {
    let server = create_server_with(Arc::new(FailingStore));

    let response = server
        .patch(&format!("/books/cover-image/{}", MISSING_ID))
        .multipart(cover_form("cover.png", "image/png"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Internal server error");
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_create_then_delete_round() {
    let server = create_test_server();

    let response = server.post("/books").json(&sample_book()).await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "T");
    let id = body["data"]["id"].as_str().unwrap();

    server
        .delete(&format!("/books/{}", id))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/books/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_json_store_backed_server() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        data_path: temp_dir.path().to_path_buf(),
        ..Config::default()
    };

    let state = AppState::from_config(&config).await.unwrap();
    let server = TestServer::new(create_router(state, &config)).unwrap();
    let id = create_book(&server, &sample_book()).await;

    // A second server over the same directory sees the record
    let state = AppState::from_config(&config).await.unwrap();
    let server = TestServer::new(create_router(state, &config)).unwrap();
    let response = server.get(&format!("/books/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "T");
}
