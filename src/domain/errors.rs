//! Error taxonomy for policy gate runs.

use thiserror::Error;

/// Errors returned by the remote repository service port.
///
/// Adapters map their transport-specific failures into these kinds so the
/// decision engine can branch on "the ref does not exist" without looking
/// at status codes or message text.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Returns true if the remote reported the queried resource as missing.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for port calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Gate-level errors. Every variant is fatal once it reaches the run loop.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Ref not found: {git_ref}: {source}")]
    NotFound {
        git_ref: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to retrieve {what}: {source}")]
    Retrieval {
        what: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to {action} comment: {source}")]
    Report {
        action: &'static str,
        #[source]
        source: RemoteError,
    },
}

impl GateError {
    /// Wrap a listing failure, keeping `NotFound` distinguishable.
    pub fn retrieval(what: impl Into<String>, git_ref: &str, source: RemoteError) -> Self {
        if source.is_not_found() {
            Self::NotFound {
                git_ref: git_ref.to_string(),
                source,
            }
        } else {
            Self::Retrieval {
                what: what.into(),
                source,
            }
        }
    }

    /// Short machine-readable kind, used in JSON output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NotFound { .. } => "not_found",
            Self::Retrieval { .. } => "retrieval",
            Self::Report { .. } => "report",
        }
    }
}

/// Result alias used throughout the decision engine.
pub type GateResult<T> = Result<T, GateError>;
