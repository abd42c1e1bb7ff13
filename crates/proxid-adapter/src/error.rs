//! Adapter error taxonomy.
//!
//! Three failure classes cross the adapter boundary: configuration errors
//! (fatal at startup), transport errors (backend unreachable or a malformed
//! query), and remote errors (the backend processed the call and reported an
//! application-level failure). A lookup that simply finds nothing is never an
//! error — operations return absent/empty for that.

use thiserror::Error;

/// Errors reported by backend adapters and their transports.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Invalid or unreadable configuration (connection settings, attribute
    /// translation table).
    #[error("adapter configuration error: {0}")]
    Configuration(String),

    /// The backend could not be reached or rejected the query itself.
    #[error("backend transport error: {0}")]
    Transport(String),

    /// The backend reported an application-level error for the call.
    #[error("backend remote error: {0}")]
    Remote(String),
}

impl AdapterError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a remote error.
    #[must_use]
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Checks if this is a transport-level error.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Checks if this is a remote-reported application error.
    #[must_use]
    pub const fn is_remote_error(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(AdapterError::transport("connection refused").is_transport_error());
        assert!(AdapterError::remote("UserNotExistsException").is_remote_error());
        assert!(!AdapterError::config("missing hostname").is_transport_error());
    }
}
