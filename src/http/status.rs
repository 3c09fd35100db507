//! Classification of HTTP error statuses into user-facing errors.

use reqwest::StatusCode;
use thiserror::Error;

/// An HTTP error status, named for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Authentication required to access this resource")]
    Unauthorized,
    #[error("Access to this resource is forbidden")]
    Forbidden,
    #[error("The requested resource was not found")]
    NotFound,
    #[error("Too many requests, try again later")]
    TooManyRequests,
    #[error("Request rejected with HTTP {0}")]
    ClientError(u16),
    #[error("Server failed with HTTP {0}")]
    ServerError(u16),
}

/// Classifies an error carrying an HTTP status. Returns `None` for errors
/// without one (connection failures, timeouts, ...).
pub fn classify_error(error: &reqwest::Error) -> Option<StatusError> {
    let status = error.status()?;
    let classified = match status {
        StatusCode::UNAUTHORIZED => StatusError::Unauthorized,
        StatusCode::FORBIDDEN => StatusError::Forbidden,
        StatusCode::NOT_FOUND => StatusError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => StatusError::TooManyRequests,
        s if s.is_client_error() => StatusError::ClientError(s.as_u16()),
        s => StatusError::ServerError(s.as_u16()),
    };
    Some(classified)
}

/// Maps an error from `error_for_status()` to an `anyhow::Error`, replacing
/// status errors with their [`StatusError`] classification.
pub fn check_status(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Some(status) => anyhow::Error::from(status),
        None => anyhow::Error::from(error),
    }
}
