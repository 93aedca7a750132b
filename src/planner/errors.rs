//! Planner error types
//!
//! Error codes:
//! - SEARCH_WINDOW_MISSING (REJECT)
//! - SEARCH_WINDOW_INVALID (REJECT)
//! - SEARCH_FILTER_UNSUPPORTED_VALUE (REJECT)
//! - SEARCH_FILTER_INVALID_FIELD (REJECT)
//!
//! Every planner error is raised before any store traffic is issued.

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// A spatial window field is absent
    SearchWindowMissing,
    /// A spatial window field is not a usable coordinate
    SearchWindowInvalid,
    /// A filter value has a type the builder cannot express
    SearchFilterUnsupportedValue,
    /// A filter field cannot be turned into an attribute name
    SearchFilterInvalidField,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::SearchWindowMissing => "SEARCH_WINDOW_MISSING",
            PlannerErrorCode::SearchWindowInvalid => "SEARCH_WINDOW_INVALID",
            PlannerErrorCode::SearchFilterUnsupportedValue => "SEARCH_FILTER_UNSUPPORTED_VALUE",
            PlannerErrorCode::SearchFilterInvalidField => "SEARCH_FILTER_INVALID_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Request field name the error is about, if any
    field: Option<String>,
}

impl PlannerError {
    /// Create a missing window field error
    pub fn window_missing(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::SearchWindowMissing,
            message: format!("Spatial window field '{}' is required", f),
            field: Some(f),
        }
    }

    /// Create an invalid window error
    pub fn window_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::SearchWindowInvalid,
            message: format!("Spatial window field '{}' {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create an unsupported value error
    pub fn unsupported_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::SearchFilterUnsupportedValue,
            message: format!("Filter '{}' has an unsupported value: {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::SearchFilterInvalidField,
            message: format!("Filter '{}' is invalid: {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the request field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
