//! HTTP error handling and response conversion.
//!
//! Handler failures are collected into [`AppError`], which maps each category
//! to a status code and a user-safe JSON body. Details stay in the logs.

use crate::domain::review::errors::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// Malformed request (400).
    BadRequest(String),

    /// Missing or invalid credentials (401).
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    Forbidden(String),

    /// Request data failed validation (400).
    ValidationError(String),

    /// The request conflicts with stored state, e.g. a repeat review (409).
    Conflict(String),

    /// Review store operation failed (500).
    Database(String),

    /// External service failure (503).
    ExternalService(String),

    /// Unclassified internal error (500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::ExternalService(msg) => write!(f, "External service error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get a user-safe error message (without implementation details).
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Resource not found".into(),
            Self::BadRequest(msg) | Self::ValidationError(msg) | Self::Conflict(msg) => {
                msg.clone()
            }
            Self::Unauthorized(_) => "Authentication required".into(),
            Self::Forbidden(_) => "Access denied".into(),
            Self::Database(_) => "Database operation failed".into(),
            Self::ExternalService(_) => "External service unavailable".into(),
            Self::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        if status.is_server_error() {
            tracing::error!("error={}", self);
        } else if status.is_client_error() {
            tracing::warn!("error={}", self);
        } else {
            tracing::info!("error={}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// === Domain Error Conversion ===

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::ValidationError(msg) => AppError::ValidationError(msg),
            DomainError::RepositoryError(msg) => {
                tracing::error!(repository_error = %msg);
                AppError::Database(msg)
            }
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::Unavailable(msg) => AppError::ExternalService(msg),
        }
    }
}

// === General Fallback Error Conversion ===

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(anyhow_error = %err, "Unclassified error with chain");
        err.chain().for_each(|cause| {
            tracing::error!(cause = %cause, "Error source");
        });
        AppError::Internal("Operation failed".into())
    }
}
