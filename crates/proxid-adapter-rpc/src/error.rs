//! RPC-specific error types.

use proxid_adapter::AdapterError;
use thiserror::Error;

/// RPC-specific errors.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Invalid configuration.
    #[error("rpc configuration error: {0}")]
    Configuration(String),

    /// HTTP-level failure (unreachable host, timeout, non-success status,
    /// undecodable body).
    #[error("rpc http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend processed the call and reported an application error.
    #[error("backend reported: {0}")]
    Remote(String),
}

impl RpcError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a remote-reported error.
    #[must_use]
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Checks if this is a remote-reported application error.
    #[must_use]
    pub const fn is_remote_error(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

impl From<RpcError> for AdapterError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Configuration(msg) => Self::Configuration(msg),
            RpcError::Http(e) => Self::Transport(e.to_string()),
            RpcError::Remote(msg) => Self::Remote(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_keep_their_class() {
        assert!(RpcError::remote("UserNotExistsException").is_remote_error());

        let err: AdapterError = RpcError::remote("UserNotExistsException").into();
        assert!(err.is_remote_error());

        let err: AdapterError = RpcError::config("missing base_url").into();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }
}
