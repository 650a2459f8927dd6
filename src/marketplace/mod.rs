//! Marketplace search relay
//!
//! - GET /shopee/search?q=... - upstream JSON returned verbatim

pub mod client;
pub mod handlers;

pub use client::{MarketplaceSearch, ShopeeClient};
pub use handlers::{search, MarketplaceState, SearchParams};
