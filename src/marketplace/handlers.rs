//! Marketplace search handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::MarketplaceSearch;
use crate::error::{ApiError, Result};
use crate::metrics::METRICS;
use crate::upstream::Upstream;

/// Marketplace API state
#[derive(Clone)]
pub struct MarketplaceState {
    pub client: Arc<dyn MarketplaceSearch>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Relay a search to the marketplace
///
/// GET /shopee/search?q=...
pub async fn search(
    State(state): State<MarketplaceState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>> {
    let query = match validate_query(params) {
        Ok(query) => query,
        Err(e) => {
            warn!("Rejected search request: {}", e);
            METRICS.record_rejection("search");
            return Err(e);
        }
    };

    info!("Marketplace search request: q={}", query);

    match state.client.search(&query).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            let err = ApiError::upstream(Upstream::Shopee, e);
            error!("Marketplace search failed: {}", err);
            Err(err)
        }
    }
}

fn validate_query(params: std::result::Result<Query<SearchParams>, QueryRejection>) -> Result<String> {
    let Query(params) = params.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    match params.q {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ApiError::InvalidInput(
            "query parameter `q` is required and cannot be empty".to_string(),
        )),
    }
}
