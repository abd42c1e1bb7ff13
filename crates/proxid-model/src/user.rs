//! User domain model.
//!
//! A user here is the already-authenticated identity as known to the
//! identity-management backend: its internal identifier plus a resolved
//! display name. Authentication itself happens upstream in the proxy
//! pipeline; this type carries lookup results only.

use serde::{Deserialize, Serialize};

/// A user resolved from the identity-management backend.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier assigned by the backend.
    pub id: String,
    /// Resolved display name, absent when the backend holds no usable name.
    pub display_name: Option<String>,
}

impl User {
    /// Creates a new user.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            display_name,
        }
    }

    /// Gets the display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}
