//! Shared plumbing for calls to third-party APIs

use std::fmt;

/// Third-party services this API relays to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    OpenAi,
    Shopee,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::OpenAi => "openai",
            Upstream::Shopee => "shopee",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single outbound call
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Metrics label for the outcome of a failed call
    pub fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) | UpstreamError::RequestFailed(_) => "unavailable",
            UpstreamError::Rejected { .. } => "rejected",
            UpstreamError::InvalidResponse(_) => "malformed",
        }
    }
}

/// Classify a transport error. The URL is stripped since it may carry a credential.
pub fn transport_error(e: reqwest::Error) -> UpstreamError {
    let timed_out = e.is_timeout();
    let message = e.without_url().to_string();
    if timed_out {
        UpstreamError::Timeout(message)
    } else {
        UpstreamError::RequestFailed(message)
    }
}

/// Longest upstream error body kept for the caller
const MAX_ERROR_BODY: usize = 512;

/// Turn a non-success response into [`UpstreamError::Rejected`]
pub async fn rejected(response: reqwest::Response) -> UpstreamError {
    let status = response.status().as_u16();
    let mut body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    UpstreamError::Rejected { status, body }
}
