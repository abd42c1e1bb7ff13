//! Enrichment step error types.

use proxid_adapter::AdapterError;
use thiserror::Error;

/// Errors raised by the enrichment step.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Invalid step configuration.
    #[error("enrichment configuration error: {0}")]
    Configuration(String),

    /// The backend adapter failed in a way that is not softened at its own
    /// boundary.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// An output-map value is neither a single name nor a set of names.
    ///
    /// Fatal for this step; the host pipeline decides whether to abort the
    /// whole request.
    #[error("unsupported output mapping for attribute {0}: expected a name or a set of names")]
    UnsupportedOutputMapping(String),
}

impl EnrichError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type for enrichment operations.
pub type EnrichResult<T> = Result<T, EnrichError>;
