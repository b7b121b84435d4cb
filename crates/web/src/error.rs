//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as
//! `{"error": <message>, "code": <ErrorCode>}`; server-side failures are
//! captured to Sentry and their details are not sent to the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use qaima_core::ErrorCode;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;

/// Application-level error type for the web server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}

fn repository_code(err: &RepositoryError) -> ErrorCode {
    match err {
        RepositoryError::Conflict(_) => ErrorCode::DuplicateEntry,
        RepositoryError::ForeignKey(_) => ErrorCode::ForeignKeyViolation,
        RepositoryError::NotFound => ErrorCode::NotFound,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            ErrorCode::DatabaseError
        }
    }
}

fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::Conflict(_) => "Record already exists".to_string(),
        RepositoryError::ForeignKey(_) => "Referenced record does not exist".to_string(),
        RepositoryError::NotFound => "Not found".to_string(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_string()
        }
    }
}

impl AppError {
    /// The machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Database(err) | Self::Catalog(CatalogError::Repository(err)) => {
                repository_code(err)
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::InvalidToken
                | AuthError::TokenExpired => ErrorCode::AuthenticationError,
                AuthError::AdminAlreadyExists => ErrorCode::DuplicateEntry,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
                    ErrorCode::ValidationError
                }
                AuthError::Repository(err) => repository_code(err),
                AuthError::PasswordHash => ErrorCode::InternalError,
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) => ErrorCode::ValidationError,
                CatalogError::CategoryNotFound | CatalogError::ItemNotFound => ErrorCode::NotFound,
                CatalogError::Repository(err) => repository_code(err),
            },
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Unauthorized(_) => ErrorCode::AuthenticationError,
            Self::Forbidden(_) => ErrorCode::AuthorizationError,
            Self::BadRequest(_) => ErrorCode::ValidationError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        if self.code().is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(err) | Self::Catalog(CatalogError::Repository(err)) => {
                repository_message(err)
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::InvalidToken | AuthError::TokenExpired => "Unauthorized".to_string(),
                AuthError::AdminAlreadyExists => {
                    "An admin with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(err) => repository_message(err),
                AuthError::PasswordHash => "Internal server error".to_string(),
            },
            Self::Catalog(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        // Capture server errors to Sentry
        if code.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                code = %code,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, code = %code, "Request rejected");
        }

        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.public_message(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin ID.
///
/// Call this after successful authentication to associate errors with admins.
pub fn set_sentry_user(admin_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let (status, body) = render(AppError::Catalog(CatalogError::Validation(
            "Name is required".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name is required");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_not_found_bodies_carry_bare_message() {
        let (status, body) = render(AppError::Catalog(CatalogError::ItemNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Item not found");

        let (_, body) = render(AppError::Catalog(CatalogError::CategoryNotFound)).await;
        assert_eq!(body["error"], "Category not found");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (
                AppError::Database(RepositoryError::Conflict("x".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Database(RepositoryError::ForeignKey("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Catalog(CatalogError::CategoryNotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Auth(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Forbidden("no".into()),
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(render(err).await.0, expected);
        }
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = render(AppError::Database(RepositoryError::DataCorruption(
            "bad row 17".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "DATABASE_ERROR");
    }
}
