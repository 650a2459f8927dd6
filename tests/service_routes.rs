//! Welcome, health, metrics and fallback routes

mod common;

use axum::{body::Body, http::{Request, StatusCode}};
use common::*;
use plantpick_api::{config::ConfigError, Config};
use serde_json::json;

const UNUSED: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_root_welcome_message() {
    let (status, body) = send_json(app(UNUSED, UNUSED), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to PlantPick API"}));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send_json(app(UNUSED, UNUSED), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "plantpick-api");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (status, body) = send_json(app(UNUSED, UNUSED), get("/identify/")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let response = send(app(UNUSED, UNUSED), get("/metrics")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = send(app(UNUSED, UNUSED), get("/")).await;
    let id = response.headers().get("x-request-id").expect("x-request-id header");
    assert_eq!(id.to_str().unwrap().len(), 36);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-supplied-id")
        .body(Body::empty())
        .unwrap();
    let response = send(app(UNUSED, UNUSED), request).await;
    assert_eq!(response.headers()["x-request-id"], "client-supplied-id");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let request = Request::builder()
        .uri("/")
        .header("origin", "https://plantpick.example")
        .body(Body::empty())
        .unwrap();
    let response = send(app(UNUSED, UNUSED), request).await;

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[test]
fn test_missing_credential_prevents_startup() {
    let builder = config::Config::builder()
        .set_override("openai.api_key", "sk-test")
        .unwrap();

    match Config::from_builder(builder) {
        Err(ConfigError::MissingCredential(var)) => assert_eq!(var, "SHOPEE_API_KEY"),
        other => panic!("Expected MissingCredential, got {:?}", other.map(|_| ())),
    }
}
