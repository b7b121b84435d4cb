//! Machine-readable error codes returned by the HTTP API.

use serde::{Deserialize, Serialize};

/// Classification of a failed request.
///
/// Serialized in `SCREAMING_SNAKE_CASE` (`"DUPLICATE_ENTRY"`, ...) so clients
/// can branch on the code instead of the translated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A unique constraint was violated.
    DuplicateEntry,
    /// A record referenced a category that does not exist.
    ForeignKeyViolation,
    /// A required field was missing or malformed.
    ValidationError,
    /// Lookup by identifier found nothing.
    NotFound,
    /// Credentials or bearer token were missing or wrong.
    AuthenticationError,
    /// The caller is authenticated but not allowed to do this.
    AuthorizationError,
    /// The store failed.
    DatabaseError,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// HTTP status code conventionally paired with this error code.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::DuplicateEntry => 409,
            Self::ForeignKeyViolation | Self::ValidationError => 400,
            Self::NotFound => 404,
            Self::AuthenticationError => 401,
            Self::AuthorizationError => 403,
            Self::DatabaseError | Self::InternalError => 500,
        }
    }

    /// The wire representation of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateEntry => "DUPLICATE_ENTRY",
            Self::ForeignKeyViolation => "FOREIGN_KEY_VIOLATION",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::AuthorizationError => "AUTHORIZATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure is the server's fault (5xx).
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.http_status() >= 500
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
