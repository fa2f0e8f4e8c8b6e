//! Book collection service

use chrono::Utc;
use rand::Rng;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookPayload, BookQuery, BookSummary},
    repository::Repository,
};

/// Maximum list size when no `finished` filter is given
pub const DEFAULT_LIST_LIMIT: usize = 2;
/// Maximum list size when a `finished` filter is given
pub const FINISHED_LIST_LIMIT: usize = 3;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 16;

/// Generate a 16-character URL-safe record id
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book and return its id.
    ///
    /// The record is stored before the payload is checked, so a rejected
    /// payload still leaves its record in the collection.
    pub fn add(&self, payload: BookPayload) -> AppResult<String> {
        let has_name = payload.has_name();
        let read_page_too_large = payload.read_page_exceeds_page_count();

        let id = generate_id();
        let book = Book::new(id.clone(), payload, Utc::now());
        let stored = self.repository.books.insert(book)?;

        if !has_name {
            tracing::warn!("Book {} stored without a name", id);
            return Err(AppError::Validation(
                "Failed to add book. Please provide the book name".to_string(),
            ));
        }

        if read_page_too_large {
            tracing::warn!("Book {} stored with readPage greater than pageCount", id);
            return Err(AppError::Validation(
                "Failed to add book. readPage cannot be greater than pageCount".to_string(),
            ));
        }

        if !stored {
            return Err(AppError::Persistence("Failed to add book".to_string()));
        }

        tracing::info!("Book added: id={}", id);
        Ok(id)
    }

    /// List books matching the query, projected and truncated.
    ///
    /// Filters run one after another (name, reading, finished) and the
    /// first one that leaves nothing ends the search with its own message.
    pub fn list(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let mut books = self.repository.books.list()?;

        if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
            books.retain(|b| b.name_contains(name));
            if books.is_empty() {
                return Err(AppError::NotFound(format!(
                    "Book not found with name: {}",
                    name
                )));
            }
        }

        if let Some(reading) = query.reading.as_deref() {
            let is_reading = reading == "1";
            books.retain(|b| b.reading == Some(is_reading));
            if books.is_empty() {
                return Err(AppError::NotFound(format!(
                    "Book not found with reading status: {}",
                    reading
                )));
            }
        }

        if let Some(finished) = query.finished.as_deref() {
            let is_finished = finished == "1";
            books.retain(|b| b.finished == is_finished);
            if books.is_empty() {
                return Err(AppError::NotFound(format!(
                    "Book not found with finished status: {}",
                    finished
                )));
            }
        }

        let limit = if query.finished.is_some() {
            FINISHED_LIST_LIMIT
        } else {
            DEFAULT_LIST_LIMIT
        };

        let summaries: Vec<BookSummary> = books
            .iter()
            .filter_map(Book::summary)
            .take(limit)
            .collect();

        if summaries.is_empty() {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        Ok(summaries)
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Replace the mutable fields of a book.
    ///
    /// The payload is checked before the id is looked up.
    pub fn update(&self, id: &str, payload: BookPayload) -> AppResult<Book> {
        if !payload.has_name() {
            return Err(AppError::Validation(
                "Failed to update book. Please provide the book name".to_string(),
            ));
        }

        if payload.read_page_exceeds_page_count() {
            return Err(AppError::Validation(
                "Failed to update book. readPage cannot be greater than pageCount".to_string(),
            ));
        }

        let now = Utc::now();
        let updated = self
            .repository
            .books
            .update(id, |book| book.apply(payload, now))?
            .ok_or_else(|| {
                AppError::NotFound("Failed to update book. Id not found".to_string())
            })?;

        tracing::info!("Book updated: id={}", id);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        if !self.repository.books.delete(id)? {
            return Err(AppError::NotFound(
                "Failed to delete book. Id not found".to_string(),
            ));
        }
        tracing::info!("Book deleted: id={}", id);
        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> AppResult<usize> {
        self.repository.books.count()
    }
}
