//! API integration tests

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_server::{api, AppState};

fn app() -> Router {
    api::create_router(AppState::new())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn book(name: &str, page_count: i64, read_page: i64, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

/// Add a book and return its id
async fn add(app: &Router, payload: Value) -> String {
    let (status, body) = send(app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["bookId"]
        .as_str()
        .expect("No book id in response")
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_book_count() {
    let app = app();
    add(&app, book("Dune", 100, 10, false)).await;

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], 1);
}

#[tokio::test]
async fn test_add_book() {
    let app = app();
    let payload = book("Dune", 100, 10, false);
    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book added successfully");
    assert_eq!(body["data"]["bookId"].as_str().map(str::len), Some(16));
}

#[tokio::test]
async fn test_add_book_without_name_is_rejected_but_stored() {
    let app = app();
    let mut payload = book("", 100, 10, false);
    payload.as_object_mut().unwrap().remove("name");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Failed to add book. Please provide the book name");
    assert!(body.get("data").is_none());

    let (_, ready) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(ready["books"], 1);
}

#[tokio::test]
async fn test_add_book_read_page_exceeds_page_count() {
    let app = app();
    let payload = book("Dune", 100, 150, false);
    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Failed to add book. readPage cannot be greater than pageCount"
    );
}

#[tokio::test]
async fn test_add_book_with_malformed_body() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "name": "Dune", "pageCount": "many" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_get_book() {
    let app = app();
    let id = add(&app, book("Dune", 100, 100, true)).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let stored = &body["data"]["book"];
    assert_eq!(stored["id"], id.as_str());
    assert_eq!(stored["name"], "Dune");
    assert_eq!(stored["pageCount"], 100);
    assert_eq!(stored["readPage"], 100);
    assert_eq!(stored["finished"], true);
    assert_eq!(stored["reading"], true);
    assert_eq!(stored["insertedAt"], stored["updatedAt"]);
}

#[tokio::test]
async fn test_get_unknown_book() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/books/xxxxx", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_list_without_filters_returns_first_two() {
    let app = app();
    let first = add(&app, book("First", 10, 1, false)).await;
    let second = add(&app, book("Second", 10, 1, false)).await;
    add(&app, book("Third", 10, 1, false)).await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body.get("message").is_none());

    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["id"], first.as_str());
    assert_eq!(books[1]["id"], second.as_str());
    assert_eq!(
        books[0],
        json!({ "id": first, "name": "First", "publisher": "Dicoding Indonesia" })
    );
}

#[tokio::test]
async fn test_list_by_name_is_case_insensitive() {
    let app = app();
    add(&app, book("Harry Potter", 10, 1, false)).await;
    add(&app, book("Dune", 10, 1, false)).await;

    let (status, body) = send(&app, Method::GET, "/books?name=harry", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["name"], "Harry Potter");

    let (status, body) = send(&app, Method::GET, "/books?name=tolkien", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found with name: tolkien");
}

#[tokio::test]
async fn test_list_by_reading() {
    let app = app();
    add(&app, book("A", 10, 1, true)).await;
    add(&app, book("B", 10, 1, false)).await;
    add(&app, book("C", 10, 1, true)).await;
    add(&app, book("D", 10, 1, true)).await;

    let (status, body) = send(&app, Method::GET, "/books?reading=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["name"], "A");
    assert_eq!(books[1]["name"], "C");
    assert!(books[0].get("reading").is_none());
}

#[tokio::test]
async fn test_list_by_finished_returns_up_to_three() {
    let app = app();
    for name in ["A", "B", "C", "D"] {
        add(&app, book(name, 10, 10, false)).await;
    }
    add(&app, book("E", 10, 5, false)).await;

    let (status, body) = send(&app, Method::GET, "/books?finished=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, Method::GET, "/books?finished=0", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["name"], "E");
}

#[tokio::test]
async fn test_list_with_repeated_query_key_keeps_envelope() {
    let app = app();
    add(&app, book("Dune", 10, 1, true)).await;

    let (status, body) = send(&app, Method::GET, "/books?reading=1&reading=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].as_str().unwrap().contains("reading"));
}

#[tokio::test]
async fn test_list_empty_collection() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn test_update_book() {
    let app = app();
    let id = add(&app, book("Dune", 100, 50, false)).await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{}", id), None).await;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(book("Dune Messiah", 100, 100, true)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book updated successfully");

    let (_, after) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    let (before, after) = (&before["data"]["book"], &after["data"]["book"]);
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert_ne!(after["updatedAt"], before["updatedAt"]);
    assert_eq!(after["name"], "Dune Messiah");
    assert_eq!(after["readPage"], 100);
    // finished is only derived at creation
    assert_eq!(after["finished"], false);
}

#[tokio::test]
async fn test_update_validation_precedes_lookup() {
    let app = app();
    let payload = book("", 10, 1, false);
    let (status, body) = send(&app, Method::PUT, "/books/unknown", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to update book. Please provide the book name");

    let payload = book("X", 10, 11, false);
    let (status, body) = send(&app, Method::PUT, "/books/unknown", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Failed to update book. readPage cannot be greater than pageCount"
    );

    let payload = book("X", 10, 1, false);
    let (status, body) = send(&app, Method::PUT, "/books/unknown", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to update book. Id not found");
}

#[tokio::test]
async fn test_delete_book() {
    let app = app();
    let id = add(&app, book("Dune", 100, 50, false)).await;

    let (status, body) = send(&app, Method::DELETE, "/books/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to delete book. Id not found");

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book deleted successfully");

    let (status, _) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
}
