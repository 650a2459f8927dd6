//! Plant identification handler

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::PlantIdentifier;
use super::models::{IdentifyResponse, UploadedImage};
use crate::error::{ApiError, Result};
use crate::metrics::METRICS;
use crate::upstream::Upstream;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Identification API state
#[derive(Clone)]
pub struct IdentifyState {
    pub identifier: Arc<dyn PlantIdentifier>,
    pub max_upload_bytes: usize,
}

/// Identify the plant in an uploaded image
///
/// POST /upload/analyze-image
pub async fn identify_plant(
    State(state): State<IdentifyState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<IdentifyResponse>> {
    let image = match read_upload(multipart, state.max_upload_bytes).await {
        Ok(image) => image,
        Err(e) => {
            warn!("Rejected image upload: {}", e);
            METRICS.record_rejection("identify_plant");
            return Err(e);
        }
    };

    info!(
        "Image identification request: {} bytes, file_name={:?}",
        image.len(),
        image.file_name
    );

    match state.identifier.identify(image).await {
        Ok(plant_name) => Ok(Json(IdentifyResponse { plant_name })),
        Err(e) => {
            let err = ApiError::upstream(Upstream::OpenAi, e);
            error!("Image identification failed: {}", err);
            Err(err)
        }
    }
}

/// Pull the `file` field out of the form. Other fields are skipped.
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<UploadedImage> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?;

        let Some(field) = field else {
            return Err(ApiError::InvalidInput(format!(
                "multipart field `{}` is required",
                FILE_FIELD
            )));
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        if bytes.is_empty() {
            return Err(ApiError::InvalidInput("uploaded file is empty".to_string()));
        }

        return Ok(UploadedImage {
            bytes,
            content_type,
            file_name,
        });
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError, limit: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::InvalidInput(e.body_text())
    }
}
