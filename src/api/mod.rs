//! HTTP surface: router assembly, service routes and shared response bodies

pub mod error_codes;
pub mod handlers;
pub mod models;
pub mod routes;

pub use models::ApiErrorBody;
pub use routes::{build_router, build_routes, cors_layer};
