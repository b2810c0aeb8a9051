//! JSON error responses for the HTTP API.

use crate::error::ToolCallError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub const INTERNAL_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "The requested resource was not found";

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unsupported_media_type() -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        )
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND)
    }
}

impl From<ToolCallError> for ApiError {
    fn from(err: ToolCallError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        // Upstream and tool detail stays in the server log.
        error!("Error processing query: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_is_generic_500() {
        let api: ApiError =
            ToolCallError::Gateway(anyhow::anyhow!("401 invalid api key sk-abc")).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, INTERNAL_ERROR);
    }

    #[test]
    fn test_unknown_function_is_500() {
        let api: ApiError = ToolCallError::UnknownFunction("delete_database".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_schema_is_400_with_detail() {
        let api: ApiError = ToolCallError::InvalidSchema {
            index: 0,
            reason: "missing key 'type'".into(),
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.message.contains("missing key 'type'"));
    }
}
