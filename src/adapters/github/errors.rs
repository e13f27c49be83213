use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::RemoteError;

/// Errors that can occur when talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubApiError {
    /// Resource or ref does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Permission denied without a rate-limit signal (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limited again after the allowed retries
    #[error("Rate limit exceeded for {0}")]
    RateLimited(String),

    /// Any other non-success status
    #[error("Unexpected status ({0}): {1}")]
    UnexpectedStatus(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GitHubApiError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            _ => Self::UnexpectedStatus(status, body),
        }
    }
}

impl From<GitHubApiError> for RemoteError {
    fn from(err: GitHubApiError) -> Self {
        let message = err.to_string();
        match err {
            GitHubApiError::NotFound(_) => Self::NotFound(message),
            GitHubApiError::Unauthorized(_) | GitHubApiError::Forbidden(_) => {
                Self::Unauthorized(message)
            }
            GitHubApiError::RateLimited(_) => Self::RateLimited(message),
            GitHubApiError::JsonError(_) => Self::Malformed(message),
            GitHubApiError::NetworkError(ref e) if e.is_decode() => Self::Malformed(message),
            GitHubApiError::UnexpectedStatus(..)
            | GitHubApiError::NetworkError(_)
            | GitHubApiError::InvalidUrl(_) => Self::Request(message),
        }
    }
}
