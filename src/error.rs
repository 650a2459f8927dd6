//! Handler-level errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::error_codes;
use crate::api::models::ApiErrorBody;
use crate::upstream::{Upstream, UpstreamError};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Every failure a route can report to its caller
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{upstream} is unreachable: {message}")]
    UpstreamUnavailable {
        upstream: Upstream,
        timed_out: bool,
        message: String,
    },

    #[error("{upstream} rejected the request with status {status}")]
    UpstreamRejected {
        upstream: Upstream,
        status: u16,
        body: String,
    },

    #[error("{upstream} returned an unexpected response: {reason}")]
    UpstreamMalformed { upstream: Upstream, reason: String },

    #[error("route {0} not found")]
    NotFound(String),
}

impl ApiError {
    /// Attribute an outbound call failure to its upstream
    pub fn upstream(upstream: Upstream, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(message) => ApiError::UpstreamUnavailable {
                upstream,
                timed_out: true,
                message,
            },
            UpstreamError::RequestFailed(message) => ApiError::UpstreamUnavailable {
                upstream,
                timed_out: false,
                message,
            },
            UpstreamError::Rejected { status, body } => ApiError::UpstreamRejected {
                upstream,
                status,
                body,
            },
            UpstreamError::InvalidResponse(reason) => {
                ApiError::UpstreamMalformed { upstream, reason }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UpstreamUnavailable { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::UpstreamRejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ApiError::UpstreamMalformed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => error_codes::INVALID_INPUT,
            ApiError::PayloadTooLarge { .. } => error_codes::PAYLOAD_TOO_LARGE,
            ApiError::UpstreamUnavailable { .. } => error_codes::UPSTREAM_UNAVAILABLE,
            ApiError::UpstreamRejected { .. } => error_codes::UPSTREAM_REJECTED,
            ApiError::UpstreamMalformed { .. } => error_codes::UPSTREAM_MALFORMED,
            ApiError::NotFound(_) => error_codes::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = ApiErrorBody::new(self.code(), self.to_string());
        if let ApiError::UpstreamRejected { status, .. } = &self {
            body = body.with_upstream_status(*status);
        }
        (self.status(), Json(body)).into_response()
    }
}
