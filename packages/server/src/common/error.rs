//! Core error taxonomy.
//!
//! Every fallible domain operation returns `CoreResult<T>`. The variants map
//! one-to-one onto the caller-facing failure classes:
//!
//! - `PolicyViolation`: frozen conversation, blocked content. Not retryable.
//! - `InsufficientFunds`: user-correctable, reported as-is.
//! - `InvalidState`: stale client state (offer not pending, credit already
//!   used); the client should refetch.
//! - `NotAuthorized`: wrong party acting on a resource.
//! - `NotFound`: missing resource.
//!
//! Notification and broadcast failures are never represented here; they are
//! logged and swallowed at the call site.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    /// Machine-readable kind, stable across messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::PolicyViolation(_) => "policy_violation",
            CoreError::InsufficientFunds => "insufficient_funds",
            CoreError::InvalidState(_) => "invalid_state",
            CoreError::NotAuthorized(_) => "not_authorized",
            CoreError::NotFound(_) => "not_found",
            CoreError::Database(sqlx::Error::RowNotFound) => "not_found",
            CoreError::Database(_) | CoreError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::PolicyViolation(_) => StatusCode::FORBIDDEN,
            CoreError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            CoreError::InvalidState(_) => StatusCode::CONFLICT,
            CoreError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            CoreError::Database(_) | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs, not in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": message,
        }));

        (status, body).into_response()
    }
}
