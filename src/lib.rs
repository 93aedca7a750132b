//! searchx - geospatial listing search over a partitioned key-value store
//!
//! A search request names a latitude/longitude window and optional attribute
//! filters. The window is split into latitude bands; each band is queried
//! independently and concurrently, and the pages are merged into one list of
//! listings.
//!
//! # Modules
//!
//! - [`geo`]: postal code validation and bounding rectangles
//! - [`planner`]: filter normalization and per-partition query building
//! - [`store`]: record model and the paginated store contract
//! - [`executor`]: concurrent fan-out with retry and failure policy
//! - [`search`]: request normalization, execution and response shaping
//! - [`http_server`]: axum endpoint
//! - [`cli`]: command line entry point

pub mod cli;
pub mod executor;
pub mod geo;
pub mod http_server;
pub mod observability;
pub mod planner;
pub mod search;
pub mod store;
