//! PlantPick API
//!
//! Relays plant photos to a vision model for identification and search
//! terms to a marketplace search API.

pub mod api;
pub mod config;
pub mod error;
pub mod identify;
pub mod marketplace;
pub mod metrics;
pub mod server;
pub mod telemetry;
pub mod upstream;

pub use config::Config;
pub use error::{ApiError, Result};
