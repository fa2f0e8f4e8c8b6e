//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{Book, BookPayload, BookQuery, BookSummary},
    AppState,
};

use super::ApiResponse;

/// Data returned when a book is created
#[derive(Debug, Serialize, ToSchema)]
pub struct BookIdData {
    #[serde(rename = "bookId")]
    pub book_id: String,
}

/// Data returned by the book list
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookSummary>,
}

/// Data returned for a single book
#[derive(Debug, Serialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Add a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book added, `data.bookId` holds the new id"),
        (status = 400, description = "Invalid book fields", body = ErrorResponse),
        (status = 500, description = "Book could not be stored", body = ErrorResponse)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookIdData>>)> {
    let book_id = state.services.books.add(payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Book added successfully",
            BookIdData { book_id },
        )),
    ))
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Up to 2 books, 3 with a finished filter"),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 404, description = "No book matches", body = ErrorResponse),
        (status = 500, description = "Unexpected error", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<BookQuery>, AppError>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let books = state.services.books.list(&query)?;
    Ok(Json(ApiResponse::data(BookListData { books })))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details in `data.book`"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<ApiResponse<BookData>>> {
    let book = state.services.books.get_by_id(&book_id)?;
    Ok(Json(ApiResponse::data(BookData { book })))
}

/// Replace the fields of a book
#[utoipa::path(
    put,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Invalid book fields", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<BookPayload>, AppError>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.books.update(&book_id, payload)?;
    Ok(Json(ApiResponse::message("Book updated successfully")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.books.delete(&book_id)?;
    Ok(Json(ApiResponse::message("Book deleted successfully")))
}
