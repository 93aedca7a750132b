//! # HTTP Server Module
//!
//! Axum server exposing the search service.
//!
//! # Endpoints
//!
//! - `POST /search-x.api` - Listing search
//! - `/health` - Health check
//! - `/observability/metrics` - Metrics snapshot

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod search_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::ErrorResponse;
pub use search_routes::{CONSUMED_CAPACITY_HEADER, PARTIAL_RESULTS_HEADER, SEARCH_PATH};
pub use server::HttpServer;
