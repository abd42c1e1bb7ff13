//! Facility domain model.
//!
//! A facility is the backend's record of an external service or client
//! (a SAML service provider or an OIDC relying party) that groups the
//! resources users gain capabilities through.

use serde::{Deserialize, Serialize};

/// A facility resolved from the identity-management backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// Internal identifier assigned by the backend.
    pub id: String,
    /// Canonical facility name.
    pub name: String,
    /// Human-readable description, when the backend holds one.
    pub description: Option<String>,
    /// The external identifier (SAML entity ID or OIDC client ID) the
    /// facility was resolved from.
    pub source_identifier: String,
}

impl Facility {
    /// Creates a new facility.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        source_identifier: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description,
            source_identifier: source_identifier.into(),
        }
    }
}
