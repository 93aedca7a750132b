//! Search service layer
//!
//! Transport-facing glue around the executor: request normalization,
//! postal code resolution, the per-request deadline, response shaping and
//! metrics. Used by both the HTTP server and the CLI.

mod errors;
mod request;
mod response;
mod service;

pub use errors::{SearchError, SearchResult};
pub use request::{normalize_request, NormalizedRequest};
pub use response::{normalize_records, Listing};
pub use service::{SearchOutcome, SearchService, DEFAULT_QUERY_TIMEOUT};
