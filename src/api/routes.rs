//! Router assembly

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;

use super::handlers;
use crate::config::{Config, ConfigError};
use crate::error::ApiError;
use crate::identify::{self, IdentifyState, OpenAiVisionClient};
use crate::marketplace::{self, MarketplaceState, ShopeeClient};

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request ids
#[derive(Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the full application from configuration
pub fn build_router(config: &Config) -> Result<Router, ConfigError> {
    let identify_state = IdentifyState {
        identifier: Arc::new(OpenAiVisionClient::new(&config.openai)?),
        max_upload_bytes: config.server.max_upload_bytes,
    };
    let marketplace_state = MarketplaceState {
        client: Arc::new(ShopeeClient::new(&config.shopee)?),
    };
    let cors = cors_layer(&config.server.cors_allowed_origins)?;

    Ok(build_routes(
        identify_state,
        marketplace_state,
        cors,
        config.server.max_upload_bytes,
    ))
}

/// Wire handlers and middleware around already-built states
pub fn build_routes(
    identify_state: IdentifyState,
    marketplace_state: MarketplaceState,
    cors: CorsLayer,
    max_body_bytes: usize,
) -> Router {
    let identify_routes = Router::new()
        .route(
            "/upload/analyze-image",
            post(identify::identify_plant).get(identify::identify_plant),
        )
        .with_state(identify_state);

    let marketplace_routes = Router::new()
        .route("/shopee/search", get(marketplace::search))
        .with_state(marketplace_state);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(identify_routes)
        .merge(marketplace_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::map_response_with_state(
            max_body_bytes,
            payload_too_large_as_json,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
}

/// The body limit layer answers oversized requests with a plain-text 413
/// before any handler runs; give those the same error body as the rest.
async fn payload_too_large_as_json(State(limit): State<usize>, response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        ApiError::PayloadTooLarge { limit }.into_response()
    } else {
        response
    }
}

/// Any origin when the list is empty, otherwise exactly the listed origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| ConfigError::Invalid(format!("invalid CORS origin: {}", o)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_accepts_origin_list() {
        let origins = vec!["https://plantpick.app".to_string()];
        assert!(cors_layer(&origins).is_ok());
        assert!(cors_layer(&[]).is_ok());
    }

    #[tokio::test]
    async fn test_plain_413_becomes_error_body() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let response = payload_too_large_as_json(State(1024), plain).await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(json["error"]["message"], "request body exceeds 1024 bytes");
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let ok = (StatusCode::OK, "fine").into_response();
        let response = payload_too_large_as_json(State(1024), ok).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"fine");
    }

    #[test]
    fn test_cors_rejects_bad_origin() {
        let origins = vec!["bad\norigin".to_string()];
        assert!(matches!(cors_layer(&origins), Err(ConfigError::Invalid(_))));
    }
}
