//! API error handling
//!
//! Translates the domain error taxonomy into the wire envelope:
//! `{ "success": false, "error": ..., "code": ... }` with a matching HTTP
//! status. Unbalanced postings and storage failures log their detail
//! server-side and return a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_ledger::LedgerError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body, per the API contract
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => ApiError::Validation(msg),
            LedgerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            LedgerError::Conflict(msg) => ApiError::Conflict(msg),
            LedgerError::InvalidState(msg) => ApiError::Conflict(msg),
            LedgerError::Unbalanced { debits, credits } => {
                // A strategy bug, never user-correctable; keep the detail out
                // of the response
                tracing::error!(%debits, %credits, "Unbalanced entry reached the posting engine");
                ApiError::Internal("The posting could not be completed".to_string())
            }
            LedgerError::Storage(detail) => {
                tracing::error!(%detail, "Storage failure during unit of work");
                ApiError::Internal("A storage error occurred".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error at the API boundary");
        ApiError::Internal("A storage error occurred".to_string())
    }
}
