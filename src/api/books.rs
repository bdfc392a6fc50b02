//! Book endpoints

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
    AppState,
};

use super::{ApiJson, BookId, JsonOrText, ListQuery};

pub static SERVER_NOTE_HEADER: HeaderName = HeaderName::from_static("x-server-note");
const SERVER_NOTE: &str = "served from in-memory store; data resets on restart";

/// Paginated list of books
#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Items per page
    pub limit: usize,
    /// Number of books matching the filter, before pagination
    pub total: usize,
    pub data: Vec<Book>,
}

/// Single book envelope
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub data: Book,
}

/// Single book plus the cookies the client sent
#[derive(Serialize, ToSchema)]
pub struct BookWithCookiesResponse {
    pub data: Book,
    pub cookies: BTreeMap<String, String>,
}

/// List books with author filter and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("author" = Option<String>, Query, description = "Case-insensitive substring of the author"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<usize>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "List of books", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    ListQuery(query): ListQuery,
) -> ApiJson<BookListResponse> {
    let page = state.services.catalog.search_books(&query).await;

    ApiJson(BookListResponse {
        page: page.page,
        limit: page.limit,
        total: page.total,
        data: page.books,
    })
}

/// Get a book by ID, echoing the request cookies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookWithCookiesResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let book = state.services.catalog.get_book(id).await?;

    let cookies = jar
        .iter()
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect();

    Ok((
        [(SERVER_NOTE_HEADER.clone(), HeaderValue::from_static(SERVER_NOTE))],
        ApiJson(BookWithCookiesResponse {
            data: book,
            cookies,
        }),
    ))
}

/// Create a new book and start a session
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = crate::models::book::BookFields,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Missing title or author", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonOrText(body): JsonOrText,
) -> AppResult<impl IntoResponse> {
    let book = state.services.catalog.create_book(&body).await?;
    let jar = jar.add(state.services.sessions.session_cookie());

    Ok((StatusCode::CREATED, jar, ApiJson(BookResponse { data: book })))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = crate::models::book::BookFields,
    responses(
        (status = 200, description = "Book replaced", body = BookResponse),
        (status = 400, description = "Missing title or author", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn replace_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    JsonOrText(body): JsonOrText,
) -> AppResult<ApiJson<BookResponse>> {
    let book = state.services.catalog.replace_book(id, &body).await?;
    Ok(ApiJson(BookResponse { data: book }))
}

/// Update some fields of a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = crate::models::book::BookFields,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Empty body", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn patch_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    JsonOrText(body): JsonOrText,
) -> AppResult<ApiJson<BookResponse>> {
    let book = state.services.catalog.patch_book(id, &body).await?;
    Ok(ApiJson(BookResponse { data: book }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted, returned one last time", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> AppResult<ApiJson<BookResponse>> {
    let book = state.services.catalog.delete_book(id).await?;
    Ok(ApiJson(BookResponse { data: book }))
}

/// Fallback for unknown paths and unsupported methods
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
