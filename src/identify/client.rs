//! Vision model client for plant identification

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Instant;
use tracing::{debug, error};

use super::models::{ChatCompletionRequest, ChatCompletionResponse, UploadedImage};
use crate::config::{ConfigError, OpenAiConfig};
use crate::metrics::METRICS;
use crate::upstream::{self, Upstream, UpstreamError};

/// Anything that can name the plant in an image
#[async_trait]
pub trait PlantIdentifier: Send + Sync {
    async fn identify(&self, image: UploadedImage) -> Result<String, UpstreamError>;
}

/// OpenAI chat completions client
pub struct OpenAiVisionClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
}

impl OpenAiVisionClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build OpenAI client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn call_chat_completions(&self, image: &UploadedImage) -> Result<String, UpstreamError> {
        let request = ChatCompletionRequest::identify_plant(&self.model, self.max_tokens, image);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(upstream::transport_error)?;

        if !response.status().is_success() {
            return Err(upstream::rejected(response).await);
        }

        let body = response.bytes().await.map_err(upstream::transport_error)?;

        let completion: ChatCompletionResponse = serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::InvalidResponse(format!("body is not a chat completion: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::InvalidResponse("response contained no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| UpstreamError::InvalidResponse("first choice has no content".to_string()))
    }
}

#[async_trait]
impl PlantIdentifier for OpenAiVisionClient {
    async fn identify(&self, image: UploadedImage) -> Result<String, UpstreamError> {
        let start = Instant::now();
        debug!(
            "Calling {} with {} byte image ({})",
            self.model,
            image.len(),
            image.mime()
        );

        let result = self.call_chat_completions(&image).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => {
                error!("OpenAI call failed: {}", e);
                e.outcome()
            }
        };
        METRICS.record_upstream(Upstream::OpenAi, outcome, start.elapsed());

        result
    }
}
