//! Bookshelf
//!
//! A small REST JSON API over an in-memory book catalog. Reads are public;
//! mutations require a shared bearer token. Data lives only as long as the
//! process.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository)),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api-docs/openapi.json", get(api::openapi::openapi_json))
        .route(
            "/books",
            get(api::books::list_books)
                .post(api::books::create_book)
                .fallback(api::books::not_found),
        )
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::replace_book)
                .patch(api::books::patch_book)
                .delete(api::books::delete_book)
                .fallback(api::books::not_found),
        );

    with_edge_layers(routes, state)
}

/// Wrap routes with the body limit, bearer gate, panic recovery, CORS/timing
/// stamp and request tracing, then attach the state.
pub fn with_edge_layers(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(api::books::not_found)
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::require_bearer,
        ))
        .layer(CatchPanicLayer::custom(api::middleware::handle_panic))
        .layer(middleware::from_fn(api::middleware::stamp_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
