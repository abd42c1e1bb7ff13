//! Group domain model.
//!
//! Groups carry membership within an owning organization. Membership is
//! resolved per (user, facility) pair at request time and is never cached
//! across invocations.

use serde::{Deserialize, Serialize};

/// A group resolved from the identity-management backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Internal identifier assigned by the backend.
    pub id: String,
    /// Identifier of the organization owning the group.
    pub org_id: String,
    /// Group name (unique within the owning organization only).
    pub name: String,
    /// Human-readable description, when the backend holds one.
    pub description: Option<String>,
    /// Globally unique qualified name (organization-prefixed).
    pub unique_name: String,
}

impl Group {
    /// Creates a new group.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        org_id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        unique_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            name: name.into(),
            description,
            unique_name: unique_name.into(),
        }
    }
}
