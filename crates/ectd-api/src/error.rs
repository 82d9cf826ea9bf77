//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps assembly errors to HTTP status codes and JSON error bodies with a
//! machine-readable code. The `details` object is populated only for client
//! errors; 500-class responses never carry internal detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ectd_assembler::AssemblyError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "VALIDATION_ERROR", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type for Axum handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {message}")]
    NotFound {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The request was well-formed HTTP but semantically invalid (422).
    /// Plan validation failures land here with the specifics in `details`.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Conflict with current state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A dependency the route needs is not configured (503).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error (500). Logged, never returned to the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// A sequence committed but its tree failed to publish (500). The
    /// message is returned: operators need the sequence number to recover.
    #[error("{0}")]
    PartiallyCommitted(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::PartiallyCommitted(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PARTIALLY_COMMITTED")
            }
        }
    }

    fn validation(message: String, details: Option<serde_json::Value>) -> Self {
        Self::Validation { message, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let details = match &self {
            Self::NotFound { details, .. } | Self::Validation { details, .. } => details.clone(),
            _ => None,
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::PartiallyCommitted(_) => {
                tracing::error!(error = %self, "partially committed sequence")
            }
            Self::Unavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AssemblyError> for AppError {
    fn from(err: AssemblyError) -> Self {
        match &err {
            AssemblyError::MissingRequiredModules(missing) => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "missing_modules": missing })),
            ),
            AssemblyError::DuplicateSingletonModule(modules) => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "duplicate_singleton_modules": modules })),
            ),
            AssemblyError::ReplaceWithoutPrecedent(modules) => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "unprecedented_modules": modules })),
            ),
            AssemblyError::DuplicateSlot { module } => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "module": module })),
            ),
            AssemblyError::MissingRegionalMetadata(region) => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "region": region })),
            ),
            AssemblyError::RegionNotConfigured(region) => Self::validation(
                err.to_string(),
                Some(serde_json::json!({ "region": region })),
            ),
            AssemblyError::Sequence(_) => Self::validation(err.to_string(), None),
            AssemblyError::SequenceNumberConflict(_) => Self::Conflict(err.to_string()),
            AssemblyError::DocumentNotFound(id) => Self::NotFound {
                message: err.to_string(),
                details: Some(serde_json::json!({ "document_id": id })),
            },
            AssemblyError::SequenceNotFound(_) => Self::NotFound {
                message: err.to_string(),
                details: None,
            },
            AssemblyError::PartiallyCommitted { .. } => Self::PartiallyCommitted(err.to_string()),
            AssemblyError::Staging { .. } | AssemblyError::Manifest(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
