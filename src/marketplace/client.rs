//! Shopee search client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error};

use crate::config::{ConfigError, ShopeeConfig};
use crate::metrics::METRICS;
use crate::upstream::{self, Upstream, UpstreamError};

/// Anything that can run a marketplace search
#[async_trait]
pub trait MarketplaceSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Value, UpstreamError>;
}

pub struct ShopeeClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
}

impl ShopeeClient {
    pub fn new(config: &ShopeeConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build Shopee client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/search", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    async fn call_search_api(&self, query: &str) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("api_key", self.api_key.expose_secret().as_str())])
            .send()
            .await
            .map_err(upstream::transport_error)?;

        if !response.status().is_success() {
            return Err(upstream::rejected(response).await);
        }

        let body = response.bytes().await.map_err(upstream::transport_error)?;

        serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::InvalidResponse(format!("body is not JSON: {}", e)))
    }
}

#[async_trait]
impl MarketplaceSearch for ShopeeClient {
    async fn search(&self, query: &str) -> Result<Value, UpstreamError> {
        let start = Instant::now();
        debug!("Calling Shopee search: query={}", query);

        let result = self.call_search_api(query).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => {
                error!("Shopee call failed: {}", e);
                e.outcome()
            }
        };
        METRICS.record_upstream(Upstream::Shopee, outcome, start.elapsed());

        result
    }
}
