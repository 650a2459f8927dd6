//! Service routes that do not touch an upstream

use axum::{
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};

use super::models::{HealthResponse, WelcomeResponse};
use crate::error::ApiError;
use crate::metrics::METRICS;

pub const SERVICE_NAME: &str = "plantpick-api";

/// GET /
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to PlantPick API".to_string(),
    })
}

/// Liveness probe
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
