//! Shared helpers for the integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use config::{builder::DefaultState, ConfigBuilder};
use plantpick_api::{api::build_router, Config};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

pub const OPENAI_KEY: &str = "sk-integration";
pub const SHOPEE_KEY: &str = "shopee-integration";
pub const BOUNDARY: &str = "plantpick-boundary";

/// Source stack pointing both upstreams at local mock servers
pub fn test_builder(openai_url: &str, shopee_url: &str) -> ConfigBuilder<DefaultState> {
    config::Config::builder()
        .set_override("openai.api_key", OPENAI_KEY)
        .unwrap()
        .set_override("openai.base_url", openai_url)
        .unwrap()
        .set_override("shopee.api_key", SHOPEE_KEY)
        .unwrap()
        .set_override("shopee.base_url", shopee_url)
        .unwrap()
        .set_override("server.max_upload_bytes", 64 * 1024)
        .unwrap()
}

pub fn test_config(openai_url: &str, shopee_url: &str) -> Config {
    Config::from_builder(test_builder(openai_url, shopee_url)).unwrap()
}

pub fn app(openai_url: &str, shopee_url: &str) -> Router {
    build_router(&test_config(openai_url, shopee_url)).unwrap()
}

/// Upstream that answers 200 with a truncated JSON body and then hangs.
/// Returns its base URL.
pub async fn stalled_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 256 * 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"choices\":",
            )
            .await;
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    });
    format!("http://{}", addr)
}

/// Multipart body with one file field
pub fn multipart_body(field: &str, content_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"plant.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(method: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/upload/analyze-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = send(app, request).await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
