//! HTTP error mapping
//!
//! Search errors become JSON bodies with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::search::SearchError;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub status: u16,
}

impl From<&SearchError> for ErrorResponse {
    fn from(err: &SearchError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            status: err.status_code(),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerError;

    #[test]
    fn test_status_mapping() {
        let response = SearchError::InvalidRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = SearchError::Timeout(100).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_error_body() {
        let err = SearchError::Plan(PlannerError::window_missing("minLatitude"));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "SEARCH_WINDOW_MISSING");
        assert_eq!(body.status, 400);
        assert!(body.error.contains("minLatitude"));
    }
}
