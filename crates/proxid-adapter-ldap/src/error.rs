//! Directory-specific error types.
//!
//! ## Security Note
//!
//! Error messages must not leak bind credentials or directory structure
//! beyond what the failed operation already names.

use proxid_adapter::AdapterError;
use thiserror::Error;

/// Directory-specific errors.
#[derive(Debug, Error)]
pub enum LdapError {
    /// Invalid configuration.
    #[error("directory configuration error: {0}")]
    Configuration(String),

    /// Connection to every configured directory server failed.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// Bind (service-account authentication) failed.
    #[error("directory bind failed: {0}")]
    Bind(String),

    /// Search operation failed (malformed filter or protocol error).
    #[error("directory search failed: {0}")]
    Search(String),

    /// Operation timed out.
    #[error("directory operation timed out")]
    Timeout,
}

impl LdapError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Checks if this error means the directory is unavailable.
    ///
    /// Unavailability is softened to an absent/empty result at the adapter
    /// boundary; other errors propagate.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Bind(_) | Self::Timeout)
    }
}

/// Result type for directory operations.
pub type LdapResult<T> = Result<T, LdapError>;

impl From<LdapError> for AdapterError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::Configuration(msg) => Self::Configuration(msg),
            LdapError::Connection(_) | LdapError::Bind(_) | LdapError::Timeout => {
                Self::Transport(err.to_string())
            }
            LdapError::Search(msg) => Self::Transport(msg),
        }
    }
}
