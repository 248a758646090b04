use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// RepoError
///
/// Failure of the persistence layer. Implementation-agnostic so the
/// `Repository` trait can be backed by MongoDB in production and by the
/// in-memory store in tests.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database failure: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for RepoError {
    fn from(e: mongodb::error::Error) -> Self {
        RepoError::Database(e.to_string())
    }
}

/// StorageError
///
/// Failure of the file storage layer (uploads directory).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("rejected filename: {0}")]
    InvalidFilename(String),
}

/// ApiError
///
/// The request-level error taxonomy. Every handler failure is one of these
/// variants; `IntoResponse` maps them onto the HTTP surface. Persistence and
/// storage failures are converted to a generic 500 body, with the underlying
/// cause logged server-side only.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required fields.
    #[error("{0}")]
    Validation(String),
    /// Authentication failure. One generic message regardless of whether the
    /// email was unknown or the password wrong, so the endpoint cannot be
    /// used to enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// A valid session without the admin role.
    #[error("Admin access required")]
    Forbidden,
    /// Entity lookup by id found nothing.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Underlying store or filesystem failure; details stay server-side.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin access required".to_string()),
            ApiError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource))
            }
            ApiError::Internal(cause) => {
                // Log the cause; the client only sees a generic description.
                tracing::error!(error = %cause, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
