// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::storage::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("A `{0}` is required")]
    MissingField(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("An authorization header is required")]
    MissingAuthHeader,

    #[error("Authorization header must have the form `<scheme> <token>`")]
    MalformedAuthHeader,

    #[error("Invalid session token")]
    InvalidSession,

    #[error("Password invalid")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Rollback failed, profile {pid} is orphaned: {source}")]
    CompensationFailure {
        pid: Uuid,
        source: StoreError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    ///
    /// Bad client input answers 401 rather than 400; clients depend on it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::InvalidBody(_)
            | AppError::MissingAuthHeader
            | AppError::MalformedAuthHeader
            | AppError::InvalidSession => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "VAL_001",
            AppError::InvalidBody(_) => "VAL_002",
            AppError::MissingAuthHeader => "AUTH_001",
            AppError::MalformedAuthHeader => "AUTH_002",
            AppError::InvalidSession => "AUTH_003",
            AppError::InvalidCredentials => "AUTH_004",
            AppError::NotFound(_) => "NF_001",
            AppError::Storage(_) => "STORE_001",
            AppError::CompensationFailure { .. } => "STORE_002",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::MissingField(_)
            | AppError::MissingAuthHeader
            | AppError::MalformedAuthHeader
            | AppError::InvalidSession
            | AppError::InvalidCredentials => self.to_string(),
            AppError::InvalidBody(_) => "Request body must be a JSON object".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Storage(StoreError::KeyExists(_)) => "Resource already exists".to_string(),
            AppError::Storage(_) | AppError::CompensationFailure { .. } => {
                "A storage error occurred".to_string()
            },
            AppError::Json(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
