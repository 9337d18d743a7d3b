//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Underlying error detail, when the endpoint reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Internal server error with a fixed message
    Internal(String),
    /// Failed operation reported with its underlying error
    Operation { message: String, error: String },
    /// Repository error without endpoint-specific handling
    Repository(RepositoryError),
}

impl AppError {
    pub fn operation(message: impl Into<String>, error: impl ToString) -> Self {
        AppError::Operation {
            message: message.into(),
            error: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Operation { message, error } => {
                error!(%error, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("OPERATION_FAILED", message).with_error(error),
                )
            }
            AppError::Repository(e) => {
                if e.is_not_found() {
                    (
                        StatusCode::NOT_FOUND,
                        ApiError::new("NOT_FOUND", e.message()),
                    )
                } else {
                    error!(error = %e, "Unhandled repository error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("REPOSITORY_ERROR", e.to_string()),
                    )
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}
