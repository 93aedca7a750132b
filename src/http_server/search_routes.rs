//! Search HTTP Routes
//!
//! `POST /search-x.api` takes a transport request and returns the matching
//! listings as a JSON array.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::search::{SearchError, SearchService};
use crate::store::QueryStore;

/// Search endpoint path
pub const SEARCH_PATH: &str = "/search-x.api";

/// Summed store cost of the search
pub const CONSUMED_CAPACITY_HEADER: &str = "x-consumed-capacity";

/// Present (`true`) when some partitions failed and partial results were allowed
pub const PARTIAL_RESULTS_HEADER: &str = "x-partial-results";

/// Create the search route
pub fn search_routes<S: QueryStore>(service: Arc<SearchService<S>>) -> Router {
    Router::new()
        .route(SEARCH_PATH, post(search_handler::<S>))
        .with_state(service)
}

async fn search_handler<S: QueryStore>(
    State(service): State<Arc<SearchService<S>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, SearchError> {
    let Json(raw) = body.map_err(|e| SearchError::InvalidRequest(e.body_text()))?;
    let outcome = service.search(&raw).await?;

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&outcome.consumed_capacity.to_string()) {
        headers.insert(CONSUMED_CAPACITY_HEADER, value);
    }
    if outcome.is_partial() {
        headers.insert(PARTIAL_RESULTS_HEADER, HeaderValue::from_static("true"));
    }

    Ok((StatusCode::OK, headers, Json(outcome.listings)).into_response())
}
