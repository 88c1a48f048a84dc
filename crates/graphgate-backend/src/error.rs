//! Error types for backend calls.

use thiserror::Error;

/// Errors returned by a [`GraphBackend`](crate::GraphBackend).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend could not be reached, or the call timed out.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered with a body that is not JSON.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// Client could not be constructed from configuration.
    #[error("backend client configuration error: {0}")]
    Config(String),
}
