//! Store error types
//!
//! Error codes:
//! - SEARCH_STORE_THROTTLED (RETRY)
//! - SEARCH_STORE_UNAVAILABLE (RETRY)
//! - SEARCH_STORE_REJECTED (ERROR)
//! - SEARCH_STORE_MALFORMED (ERROR)

use std::fmt;

/// Store error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Request rate exceeded provisioned capacity
    SearchStoreThrottled,
    /// Network failure or service unavailable
    SearchStoreUnavailable,
    /// Store refused the request (bad expression, unknown index)
    SearchStoreRejected,
    /// Response or record could not be understood
    SearchStoreMalformed,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::SearchStoreThrottled => "SEARCH_STORE_THROTTLED",
            StoreErrorCode::SearchStoreUnavailable => "SEARCH_STORE_UNAVAILABLE",
            StoreErrorCode::SearchStoreRejected => "SEARCH_STORE_REJECTED",
            StoreErrorCode::SearchStoreMalformed => "SEARCH_STORE_MALFORMED",
        }
    }

    /// Whether a retry may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreErrorCode::SearchStoreThrottled | StoreErrorCode::SearchStoreUnavailable
        )
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug, Clone, PartialEq)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    /// Create a throttling error
    pub fn throttled(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::SearchStoreThrottled,
            message: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::SearchStoreUnavailable,
            message: reason.into(),
        }
    }

    /// Create a rejected request error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::SearchStoreRejected,
            message: reason.into(),
        }
    }

    /// Create a malformed data error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::SearchStoreMalformed,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a retry may succeed
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = if self.is_retryable() { "RETRY" } else { "ERROR" };
        write!(f, "[{}] {}: {}", severity, self.code.code(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
