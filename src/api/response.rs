//! Response types for the attendance API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an unauthenticated error response.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::with_details(
            "UNAUTHENTICATED",
            message,
            "Send the caller's identity in the X-Actor-Id and X-Actor-Role headers",
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 413 response for a body over the transport limit.
    pub fn payload_too_large(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            error: ApiError::with_details(
                "EVIDENCE_TOO_LARGE",
                "Request body is too large",
                details,
            ),
        }
    }

    /// A 401 response for a missing or unreadable actor.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::unauthenticated(message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match (&error, error.kind()) {
            (EngineError::Forbidden { .. }, _) => StatusCode::FORBIDDEN,
            (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::StateConflict) => StatusCode::CONFLICT,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Computation) | (_, ErrorKind::Persistence) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let api_error = match &error {
            EngineError::Validation { field, message } => ApiError::with_details(
                error.code(),
                error.to_string(),
                format!("Field '{}' {}", field, message),
            ),
            EngineError::InvalidSettingValue { key, .. } => ApiError::with_details(
                error.code(),
                "Payroll configuration is invalid",
                format!("Setting '{}' must be fixed before payroll can run: {}", key, error),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiError::with_details(error.code(), "Configuration error", error.to_string())
            }
            EngineError::Persistence { .. } => {
                ApiError::with_details(error.code(), "Storage failure", error.to_string())
            }
            _ => ApiError::new(error.code(), error.to_string()),
        };

        ApiErrorResponse {
            status,
            error: api_error,
        }
    }
}
