//! # Application Error
//!
//! Maps domain errors to structured HTTP responses with proper status
//! codes and JSON error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use wharf_service::{IssueError, ReconcileError, TransitionServiceError};
use wharf_store::StoreError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation lost a concurrent update; the caller may retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PackageNotFound(id) => Self::NotFound(id.to_string()),
            StoreError::ShipmentNotFound(id) => Self::NotFound(id.to_string()),
            StoreError::Duplicate(what) => Self::Conflict(format!("already exists: {what}")),
            StoreError::Conflict(what) => Self::Conflict(what),
            StoreError::Backend(e) => {
                tracing::error!(error = %e, "store backend failure");
                Self::Internal("storage failure".to_string())
            }
        }
    }
}

impl From<TransitionServiceError> for AppError {
    fn from(err: TransitionServiceError) -> Self {
        match err {
            TransitionServiceError::PackageNotFound(id) => Self::NotFound(id.to_string()),
            TransitionServiceError::Store(e) => e.into(),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::ShipmentNotFound(id) => Self::NotFound(id.to_string()),
            ReconcileError::Store(e) => e.into(),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::PackageNotFound(id) => Self::NotFound(id.to_string()),
            IssueError::NotEligible { .. } | IssueError::CodeConsumed => {
                Self::Validation(err.to_string())
            }
            IssueError::Store(e) => e.into(),
        }
    }
}
