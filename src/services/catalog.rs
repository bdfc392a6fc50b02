//! Catalog management service

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields, BookQuery},
    repository::Repository,
};

/// One page of a filtered listing
#[derive(Debug)]
pub struct BookPage {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub books: Vec<Book>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books, filtered by author and paginated
    pub async fn search_books(&self, query: &BookQuery) -> BookPage {
        let (page, limit) = query.pagination();
        let (books, total) = self
            .repository
            .books
            .list(query.author_filter(), page, limit)
            .await;
        BookPage {
            page,
            limit,
            total,
            books,
        }
    }

    pub async fn count_books(&self) -> usize {
        self.repository.books.count().await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Create a book; title and author are both required
    pub async fn create_book(&self, body: &Value) -> AppResult<Book> {
        let (title, author) = require_title_and_author(body)?;
        let book = self.repository.books.create(title, author).await;
        tracing::info!("Created book id={}", book.id);
        Ok(book)
    }

    /// Replace a book; title and author are both required
    pub async fn replace_book(&self, id: i64, body: &Value) -> AppResult<Book> {
        let (title, author) = require_title_and_author(body)?;
        let book = self.repository.books.replace(id, title, author).await?;
        tracing::info!("Replaced book id={}", id);
        Ok(book)
    }

    /// Partially update a book from a non-empty JSON object
    pub async fn patch_book(&self, id: i64, body: &Value) -> AppResult<Book> {
        match body {
            Value::Object(map) if !map.is_empty() => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Request body must be a non-empty JSON object".to_string(),
                ))
            }
        }

        let book = self
            .repository
            .books
            .update(id, BookFields::from_body(body))
            .await?;
        tracing::info!("Patched book id={}", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<Book> {
        let book = self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(book)
    }
}

fn require_title_and_author(body: &Value) -> AppResult<(String, String)> {
    BookFields::from_body(body)
        .complete()
        .ok_or_else(|| AppError::BadRequest("title and author are required".to_string()))
}
