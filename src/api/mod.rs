//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod middleware;
pub mod openapi;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::{error::AppError, models::book::BookQuery};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// JSON response with an explicit utf-8 charset
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => (
                [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                bytes,
            )
                .into_response(),
            Err(e) => AppError::Internal(format!("Failed to serialize response: {}", e))
                .into_response(),
        }
    }
}

/// Request body read to the end and parsed as JSON.
///
/// When the bytes are not valid JSON the raw text is kept as a JSON string,
/// so handlers fail their own field checks instead of the extractor
/// rejecting the request.
#[derive(Debug, Clone)]
pub struct JsonOrText(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonOrText
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge("Request body exceeds the size limit".to_string())
            } else {
                AppError::BadRequest(rejection.body_text())
            }
        })?;
        Ok(Self(parse_body(&bytes)))
    }
}

/// Book id from the `:id` path segment.
///
/// Anything that does not decode to an integer matches no book, so every
/// failure here is a 404.
#[derive(Debug, Clone, Copy)]
pub struct BookId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => raw,
            Err(_) => return Err(AppError::NotFound("Book not found".to_string())),
        };
        raw.parse::<i64>()
            .map(Self)
            .map_err(|_| AppError::NotFound(format!("Book {} not found", raw)))
    }
}

/// List query read as raw pairs; the first value of a repeated key wins.
#[derive(Debug, Clone, Default)]
pub struct ListQuery(pub BookQuery);

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(BookQuery::from_pairs(pairs)))
    }
}

pub fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
