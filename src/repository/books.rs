//! Books repository
//!
//! Records are kept in insertion order behind a single `RwLock`. Every
//! read-modify-write sequence runs under one write guard, so concurrent
//! requests observe each mutation as a whole.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{AppError, AppResult},
    models::Book,
};

#[derive(Clone, Default)]
pub struct BooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Vec<Book>>> {
        self.books.read().map_err(poisoned)
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Vec<Book>>> {
        self.books.write().map_err(poisoned)
    }

    /// Append a record and report whether it can be found again by id
    pub fn insert(&self, book: Book) -> AppResult<bool> {
        let mut books = self.write()?;
        let id = book.id.clone();
        books.push(book);
        Ok(books.iter().any(|b| b.id == id))
    }

    /// Snapshot of all records in insertion order
    pub fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.read()?.clone())
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<Option<Book>> {
        Ok(self.read()?.iter().find(|b| b.id == id).cloned())
    }

    /// Apply `f` to the record with the given id.
    /// Returns `None` when no such record exists.
    pub fn update<F>(&self, id: &str, f: F) -> AppResult<Option<Book>>
    where
        F: FnOnce(&mut Book),
    {
        let mut books = self.write()?;
        Ok(books.iter_mut().find(|b| b.id == id).map(|book| {
            f(book);
            book.clone()
        }))
    }

    /// Remove the record with the given id; `false` when absent
    pub fn delete(&self, id: &str) -> AppResult<bool> {
        let mut books = self.write()?;
        match books.iter().position(|b| b.id == id) {
            Some(index) => {
                books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> AppResult<usize> {
        Ok(self.read()?.len())
    }
}

fn poisoned<T>(e: PoisonError<T>) -> AppError {
    AppError::Internal(format!("Book collection lock poisoned: {}", e))
}
