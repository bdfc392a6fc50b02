//! API integration tests
//!
//! Each test serves a freshly seeded router on an ephemeral port.

use axum::{routing::get, Router};
use bookshelf_server::{
    config::AppConfig, create_router, repository::Repository, with_edge_layers, AppState,
};
use reqwest::{header, Client, Response, StatusCode};
use serde_json::{json, Value};

const TOKEN: &str = "test-token";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.api_token = TOKEN.to_string();
    config
}

fn test_state() -> AppState {
    AppState::new(test_config(), Repository::seeded())
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to port");
    let addr = listener.local_addr().expect("Failed to get local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn setup_test_server() -> String {
    serve(create_router(test_state())).await
}

fn assert_json_error(response: &Response) {
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
}

fn assert_timed(response: &Response) {
    let value = response
        .headers()
        .get("x-response-time-ms")
        .expect("missing X-Response-Time-ms")
        .to_str()
        .unwrap();
    assert!(value.parse::<u64>().is_ok(), "not an integer: {}", value);
}

async fn body(response: Response) -> Value {
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_list_seeded_books() {
    let base_url = setup_test_server().await;

    let response = reqwest::get(format!("{}/books", base_url))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    assert!(response.headers().contains_key(header::CONTENT_LENGTH));
    assert_timed(&response);

    let body = body(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["id"], 1);
}

#[tokio::test]
async fn test_pagination_returns_second_item() {
    let base_url = setup_test_server().await;

    let response = reqwest::get(format!("{}/books?limit=1&page=2", base_url))
        .await
        .expect("Failed to send request");

    let body = body(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], 2);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_author_filter_is_case_insensitive() {
    let base_url = setup_test_server().await;

    let response = reqwest::get(format!("{}/books?author=kyle", base_url))
        .await
        .expect("Failed to send request");

    let body = body(response).await;
    assert_eq!(body["total"], 1);
    for book in body["data"].as_array().unwrap() {
        let author = book["author"].as_str().unwrap().to_lowercase();
        assert!(author.contains("kyle"));
    }
}

#[tokio::test]
async fn test_get_book_echoes_cookies() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .get(format!("{}/books/2", base_url))
        .header(header::COOKIE, "theme=dark; lang=en")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-server-note"));

    let body = body(response).await;
    assert_eq!(body["data"]["author"], "Kyle Simpson");
    assert_eq!(body["cookies"], json!({"theme": "dark", "lang": "en"}));
}

#[tokio::test]
async fn test_create_requires_token() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .json(&json!({"title": "Dune", "author": "Frank Herbert"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_timed(&response);
    assert!(body(response).await["error"].is_string());

    let response = client
        .post(format!("{}/books", base_url))
        .bearer_auth("wrong-token")
        .json(&json!({"title": "Dune", "author": "Frank Herbert"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_checked_before_validation() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .put(format!("{}/books/1", base_url))
        .json(&json!({"title": "No author"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_fetch() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "Dune", "author": "Frank Herbert"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_id="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));

    let created = body(response).await;
    let id = created["data"]["id"].as_i64().expect("No book ID");
    assert_eq!(id, 4);

    let response = client
        .get(format!("{}/books/{}", base_url, id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body(response).await;
    assert_eq!(fetched["data"], created["data"]);
    assert_eq!(fetched["data"]["title"], "Dune");
    assert_eq!(fetched["data"]["author"], "Frank Herbert");
}

#[tokio::test]
async fn test_create_with_invalid_json_is_bad_request() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .post(format!("{}/books", base_url))
        .bearer_auth(TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_patch_changes_only_title() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .patch(format!("{}/books/1", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "X"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(response).await;
    assert_eq!(body["data"]["title"], "X");
    assert_eq!(body["data"]["author"], "Marijn Haverbeke");
}

#[tokio::test]
async fn test_patch_empty_body_and_unknown_id() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .patch(format!("{}/books/1", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .patch(format!("{}/books/999", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "X"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_missing_author_does_not_mutate() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/books/3", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "Replaced"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_timed(&response);

    let response = client
        .get(format!("{}/books/3", base_url))
        .send()
        .await
        .expect("Failed to send request");
    let body = body(response).await;
    assert_eq!(body["data"]["title"], "JavaScript: The Good Parts");
}

#[tokio::test]
async fn test_put_replaces_book() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .put(format!("{}/books/3", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "Replaced", "author": "Someone Else"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(response).await;
    assert_eq!(
        body["data"],
        json!({"id": 3, "title": "Replaced", "author": "Someone Else"})
    );
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/books/2", base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await["data"]["id"], 2);

    let response = client
        .get(format!("{}/books/2", base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_timed(&response);
    assert!(body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_unmatched_routes_are_not_found() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = reqwest::get(format!("{}/nowhere", base_url))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_timed(&response);

    let response = reqwest::get(format!("{}/books/not-a-number", base_url))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Mutating but unrouted: gate first, then 404
    let response = client
        .put(format!("{}/books", base_url))
        .json(&json!({"title": "a", "author": "b"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .put(format!("{}/books", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": "a", "author": "b"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preflight() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/books/1", base_url))
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert_timed(&response);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cors_on_every_response() {
    let base_url = setup_test_server().await;

    let response = Client::new()
        .delete(format!("{}/books/1", base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    let routes = Router::new().route("/explode", get(explode));
    let base_url = serve(with_edge_layers(routes, test_state())).await;

    let response = reqwest::get(format!("{}/explode", base_url))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_timed(&response);
    assert_eq!(body(response).await["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let base_url = setup_test_server().await;

    let response = reqwest::get(format!("{}/health", base_url))
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let health = body(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["books"], 3);

    let response = reqwest::get(format!("{}/api-docs/openapi.json", base_url))
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    assert!(body(response).await["paths"]["/books"].is_object());
}

#[tokio::test]
async fn test_repeated_query_key_uses_first_value() {
    let base_url = setup_test_server().await;

    let response = reqwest::get(format!("{}/books?limit=1&limit=2&page=2", base_url))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(response).await;
    assert_eq!(body["limit"], 1);
    assert_eq!(body["page"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], 2);
}

#[tokio::test]
async fn test_undecodable_id_is_not_found() {
    let base_url = setup_test_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/books/%FF", base_url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_json_error(&response);
    assert!(body(response).await["error"].is_string());

    let response = client
        .delete(format!("{}/books/%FF", base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_json_error(&response);
}

#[tokio::test]
async fn test_oversized_body_is_rejected_as_json() {
    let mut config = test_config();
    config.server.max_body_bytes = 1024;
    let base_url = serve(create_router(AppState::new(config, Repository::seeded()))).await;
    let client = Client::new();

    let long_title = "x".repeat(4096);
    let response = client
        .post(format!("{}/books", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({"title": long_title, "author": "Someone"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_json_error(&response);
    assert_timed(&response);
    assert!(body(response).await["error"].is_string());

    let response = reqwest::get(format!("{}/books", base_url))
        .await
        .expect("Failed to send request");
    assert_eq!(body(response).await["total"], 3);
}
