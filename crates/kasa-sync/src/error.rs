//! Sync error types and failure classification.

use thiserror::Error;

/// Errors produced while pushing a sale to the remote ledger.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never completed (DNS, connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered 2xx but the body was not what we expect.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured endpoint URL is unusable.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

/// How a failed push should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth retrying: the request may succeed if sent again.
    Retryable,
    /// The server rejected the payload itself. Retrying the same bytes
    /// cannot help; a human has to look at it.
    Terminal,
    /// Credentials were rejected. Terminal for this push, but the fix is
    /// re-authentication rather than payload surgery.
    AuthRequired,
}

impl SyncError {
    /// Classify this failure for the retry loop.
    ///
    /// Transport failures and server-side errors (5xx, 408, 429) are
    /// retryable. 401/403 mean the token is bad. Every other client
    /// error is a payload problem and terminal.
    pub fn classify(&self) -> FailureKind {
        match self {
            SyncError::Transport(_) => FailureKind::Retryable,
            SyncError::Http { status, .. } => match status {
                401 | 403 => FailureKind::AuthRequired,
                408 | 429 => FailureKind::Retryable,
                500..=599 => FailureKind::Retryable,
                _ => FailureKind::Terminal,
            },
            SyncError::InvalidResponse(_) => FailureKind::Retryable,
            SyncError::Serialization(_)
            | SyncError::InvalidUrl(_)
            | SyncError::Config(_) => FailureKind::Terminal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.classify() == FailureKind::Retryable
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

/// Convenience alias for sync results.
pub type SyncResult<T> = Result<T, SyncError>;
