//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry and logged before a generic message goes back to the
//! client; everything else is answered with a human readable message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::collections::CollectionError;
use crate::db::RepositoryError;
use crate::middleware::CsrfError;
use crate::services::auth::AuthError;
use crate::uploads::UploadError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// CSRF token missing or wrong.
    #[error(transparent)]
    Csrf(#[from] CsrfError),

    /// Collection rule or lookup failed.
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::SessionInvalidOrExpired => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::InvalidUsername(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Csrf(_) => StatusCode::FORBIDDEN,
            Self::Collection(err) => match err {
                CollectionError::LimitExceeded { .. } | CollectionError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                CollectionError::Upload(UploadError::Io(_)) | CollectionError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                CollectionError::Upload(_) => StatusCode::BAD_REQUEST,
                CollectionError::NotFound { .. } => StatusCode::NOT_FOUND,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_owned(),
            Self::Auth(AuthError::SessionInvalidOrExpired) => "Unauthorized".to_owned(),
            _ if self.status().is_server_error() => "Internal server error".to_owned(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = serde_json::json!({
            "success": false,
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
