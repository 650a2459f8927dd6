//! Plant identification from uploaded images
//!
//! - POST /upload/analyze-image - multipart field `file`, answers `{"plant_name": ...}`

pub mod client;
pub mod handlers;
pub mod models;

pub use client::{OpenAiVisionClient, PlantIdentifier};
pub use handlers::{identify_plant, IdentifyState};
pub use models::{IdentifyResponse, UploadedImage};
