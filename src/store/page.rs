//! Paginated query protocol
//!
//! One request carries a partition query and, when continuing, the token of
//! the previous page. One response carries raw records, the next token (only
//! when more pages exist) and the capacity the page consumed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::planner::QuerySpec;

use super::attribute::RawRecord;
use super::errors::StoreResult;

/// Opaque pagination cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page request
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Query shared by every page of the partition
    pub spec: Arc<QuerySpec>,
    /// Resume after this token; `None` for the first page
    pub exclusive_start: Option<ContinuationToken>,
}

impl QueryRequest {
    /// First page of a partition query
    pub fn first(spec: Arc<QuerySpec>) -> Self {
        Self {
            spec,
            exclusive_start: None,
        }
    }

    /// Page following `token`
    pub fn after(spec: Arc<QuerySpec>, token: ContinuationToken) -> Self {
        Self {
            spec,
            exclusive_start: Some(token),
        }
    }
}

/// One page response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    /// Records in store order
    pub records: Vec<RawRecord>,
    /// Present only when more pages exist
    pub continuation: Option<ContinuationToken>,
    /// Capacity units this page consumed
    pub consumed_capacity: f64,
}

impl ResultPage {
    /// Returns true if this is the last page of the partition
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// A store reachable through the paginated query protocol
pub trait QueryStore: Send + Sync + 'static {
    /// Fetch one page
    fn query(&self, request: QueryRequest) -> impl Future<Output = StoreResult<ResultPage>> + Send;
}
