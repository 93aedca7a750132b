//! Executor error types
//!
//! Error codes:
//! - SEARCH_PLAN_REJECTED (REJECT)
//! - SEARCH_PARTITION_FAILED (ERROR)

use std::fmt;

use crate::planner::PlannerError;

use super::result::{AggregatedResult, PartitionFailure};

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request refused before any store traffic
    Reject,
    /// Store traffic failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Planning failed; nothing was sent to the store
    SearchPlanRejected,
    /// One or more partitions failed
    SearchPartitionFailed,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::SearchPlanRejected => "SEARCH_PLAN_REJECTED",
            ExecutorErrorCode::SearchPartitionFailed => "SEARCH_PARTITION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::SearchPlanRejected => Severity::Reject,
            ExecutorErrorCode::SearchPartitionFailed => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message, safe to show to callers
    message: String,
    /// Planner error behind a rejection
    planner: Option<PlannerError>,
    /// Everything collected before the failure, failures included
    partial: Option<AggregatedResult>,
}

impl ExecutorError {
    /// Create a plan rejection
    pub fn plan_rejected(cause: PlannerError) -> Self {
        Self {
            code: ExecutorErrorCode::SearchPlanRejected,
            message: cause.message().to_string(),
            planner: Some(cause),
            partial: None,
        }
    }

    /// Create a partition failure carrying the partial result
    pub fn partition_failed(partial: AggregatedResult) -> Self {
        Self {
            code: ExecutorErrorCode::SearchPartitionFailed,
            message: format!(
                "search backend failed for {} partition(s)",
                partial.failures.len()
            ),
            planner: None,
            partial: Some(partial),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the planner error behind a rejection
    pub fn planner_error(&self) -> Option<&PlannerError> {
        self.planner.as_ref()
    }

    /// Returns the per-partition failures
    pub fn failures(&self) -> &[PartitionFailure] {
        self.partial
            .as_ref()
            .map(|p| p.failures.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the partial result
    pub fn partial(&self) -> Option<&AggregatedResult> {
        self.partial.as_ref()
    }

    /// Consumes the error, returning the partial result
    pub fn into_partial(self) -> Option<AggregatedResult> {
        self.partial
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.planner
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
