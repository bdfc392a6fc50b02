//! In-memory book storage

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields},
};

/// Ordered collection plus the id counter; always locked together.
#[derive(Debug)]
struct Shelf {
    books: Vec<Book>,
    next_id: i64,
}

impl Shelf {
    fn position(&self, id: i64) -> AppResult<usize> {
        self.books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

#[derive(Clone)]
pub struct BooksRepository {
    shelf: Arc<RwLock<Shelf>>,
}

impl Default for BooksRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BooksRepository {
    /// Empty store; the first created book gets id 1
    pub fn new() -> Self {
        Self {
            shelf: Arc::new(RwLock::new(Shelf {
                books: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Store pre-filled with `(title, author)` pairs, ids assigned in order
    pub fn with_books<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let books: Vec<Book> = seed
            .into_iter()
            .zip(1..)
            .map(|((title, author), id)| Book {
                id,
                title: title.into(),
                author: author.into(),
            })
            .collect();
        let next_id = books.len() as i64 + 1;
        Self {
            shelf: Arc::new(RwLock::new(Shelf { books, next_id })),
        }
    }

    /// Filter by author substring (case-insensitive), then take one page.
    /// Returns the page and the filtered count.
    pub async fn list(
        &self,
        author: Option<&str>,
        page: usize,
        limit: usize,
    ) -> (Vec<Book>, usize) {
        let needle = author.map(str::to_lowercase);
        let shelf = self.shelf.read().await;

        let matching: Vec<&Book> = shelf
            .books
            .iter()
            .filter(|b| match &needle {
                Some(n) => b.author.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len();
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        (data, total)
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        let shelf = self.shelf.read().await;
        let idx = shelf.position(id)?;
        Ok(shelf.books[idx].clone())
    }

    pub async fn create(&self, title: String, author: String) -> Book {
        let mut shelf = self.shelf.write().await;
        let book = Book {
            id: shelf.next_id,
            title,
            author,
        };
        shelf.next_id += 1;
        shelf.books.push(book.clone());
        book
    }

    /// Replace title and author, keeping id and position
    pub async fn replace(&self, id: i64, title: String, author: String) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        let idx = shelf.position(id)?;
        let book = &mut shelf.books[idx];
        book.title = title;
        book.author = author;
        Ok(book.clone())
    }

    /// Apply only the fields that are present
    pub async fn update(&self, id: i64, fields: BookFields) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        let idx = shelf.position(id)?;
        let book = &mut shelf.books[idx];
        if let Some(title) = fields.title {
            book.title = title;
        }
        if let Some(author) = fields.author {
            book.author = author;
        }
        Ok(book.clone())
    }

    /// Remove and return the book
    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        let idx = shelf.position(id)?;
        Ok(shelf.books.remove(idx))
    }

    pub async fn count(&self) -> usize {
        self.shelf.read().await.books.len()
    }
}
