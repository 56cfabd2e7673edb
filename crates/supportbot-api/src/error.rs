//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use supportbot_chat::ChatError;

/// Message returned when an FAQ submission lacks a field.
pub const MISSING_FAQ_FIELDS: &str = "Both keyword and response are required";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    #[error("{0}")]
    BadRequest(String),
    /// 400 Bad Request with structured details.
    #[error("{message}")]
    Invalid {
        message: String,
        details: serde_json::Value,
    },
    /// 429 Too Many Requests.
    #[error("rate limit exceeded")]
    TooManyRequests,
    /// 500 Internal Server Error - unexpected server error.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Invalid { message, details } => {
                (StatusCode::BAD_REQUEST, "bad_request", message, Some(details))
            }
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "too_many_requests",
                "Rate limit exceeded".to_string(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal API error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::MessageTooLong(max) => ApiError::Invalid {
                message: err.to_string(),
                details: serde_json::json!({ "max_length": max }),
            },
            ChatError::MissingFaqFields => ApiError::BadRequest(MISSING_FAQ_FIELDS.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::TooManyRequests.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_chat_error_too_long() {
        match ApiError::from(ChatError::MessageTooLong(2000)) {
            ApiError::Invalid { details, .. } => assert_eq!(details["max_length"], 2000),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_from_chat_error_missing_fields() {
        let err = ApiError::from(ChatError::MissingFaqFields);
        assert_eq!(err.to_string(), MISSING_FAQ_FIELDS);
    }

    #[test]
    fn test_from_chat_error_knowledge_base_is_internal() {
        let err = ApiError::from(ChatError::KnowledgeBase("disk full".into()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
