//! Edge middleware: CORS, preflight, response timing, bearer gate

use std::{any::Any, time::Instant};

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, AppState};

pub static RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time-ms");

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PROTECTED_PREFIX: &str = "/books";

/// Outermost layer. Answers preflight requests, then stamps CORS headers and
/// the elapsed time on whatever response comes back.
pub async fn stamp_response(request: Request, next: Next) -> Response {
    let started = Instant::now();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    headers.insert(RESPONSE_TIME_HEADER.clone(), HeaderValue::from(elapsed_ms));
    response
}

/// Rejects mutating requests under `/books` that lack the shared token.
/// Runs before routing, so unmatched paths are gated too.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_protected(request.method(), request.uri().path()) {
        match bearer_token(request.headers()) {
            Some(token) if token == state.config.auth.api_token => {}
            Some(_) => return Err(AppError::Authentication("Invalid bearer token".to_string())),
            None => return Err(AppError::Authentication("Missing bearer token".to_string())),
        }
    }
    Ok(next.run(request).await)
}

pub fn is_protected(method: &Method, path: &str) -> bool {
    let mutating = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method);
    mutating && path.starts_with(PROTECTED_PREFIX)
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Panic handler for `CatchPanicLayer`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}
