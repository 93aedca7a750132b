//! Search service errors
//!
//! Every failure a caller can see. Messages never carry store internals;
//! those go to the log.

use thiserror::Error;

use crate::executor::{ExecutorError, ExecutorErrorCode};
use crate::planner::PlannerError;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Search errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// The transport request could not be normalized
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The filters could not be planned
    #[error("{}", .0.message())]
    Plan(#[from] PlannerError),

    /// Partition queries failed
    #[error("{}", .0.message())]
    Execution(ExecutorError),

    /// The search did not finish within its deadline
    #[error("Search timed out after {0} ms")]
    Timeout(u64),
}

impl SearchError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::InvalidRequest(_) => "SEARCH_INVALID_REQUEST",
            SearchError::Plan(e) => e.code().code(),
            SearchError::Execution(e) => e.code().code(),
            SearchError::Timeout(_) => "SEARCH_TIMEOUT",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::InvalidRequest(_) | SearchError::Plan(_) => 400,
            SearchError::Execution(_) => 502,
            SearchError::Timeout(_) => 504,
        }
    }

    /// Returns true if the caller's request was at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<ExecutorError> for SearchError {
    fn from(err: ExecutorError) -> Self {
        match (err.code(), err.planner_error()) {
            (ExecutorErrorCode::SearchPlanRejected, Some(planner)) => {
                SearchError::Plan(planner.clone())
            }
            _ => SearchError::Execution(err),
        }
    }
}
