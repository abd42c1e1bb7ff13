//! Backend adapter trait.
//!
//! One capability set, two transports: the directory-backed adapter
//! implements every operation, the RPC-backed adapter implements user and
//! attribute resolution and answers the rest with explicit neutral values.
//! The concrete adapter is chosen by a factory keyed on [`AdapterKind`].
//!
//! ## Implementation Notes
//!
//! - Adapters must be thread-safe (Send + Sync); independent pipeline
//!   invocations share one adapter instance.
//! - All operations are async to support network I/O.
//! - "Not found" is an `Ok` absent/empty result, never an error.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use proxid_model::{Facility, Group, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterResult;

// ============================================================================
// Adapter Kind
// ============================================================================

/// Which backend interface an adapter (or a translation-table entry) uses.
///
/// Doubles as the interface key of the attribute translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Directory (LDAP) interface.
    Ldap,

    /// JSON-over-HTTP management API. The default: the minimal interface
    /// every deployment of the backend exposes.
    #[default]
    Rpc,
}

impl AdapterKind {
    /// Returns the interface key as used in configuration and the
    /// translation table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ldap => "ldap",
            Self::Rpc => "rpc",
        }
    }
}

// ============================================================================
// Adapter Capability Set
// ============================================================================

/// Capability set of an identity-management backend adapter.
#[async_trait]
pub trait IdmAdapter: Send + Sync {
    /// Resolves a user from the identity source it authenticated at and its
    /// candidate login identifiers there.
    ///
    /// Returns `None` when no candidate login matches.
    async fn get_user(&self, source_id: &str, logins: &[String]) -> AdapterResult<Option<User>>;

    /// Resolves a facility by its external identifier (SAML entity ID or
    /// OIDC client ID).
    async fn get_facility_by_identifier(&self, identifier: &str)
        -> AdapterResult<Option<Facility>>;

    /// Resolves the groups through which the user has access on the given
    /// facility.
    ///
    /// The order of returned groups is the backend's native result order and
    /// is not guaranteed stable.
    async fn get_user_groups_on_facility(
        &self,
        user_id: &str,
        facility_id: &str,
    ) -> AdapterResult<Vec<Group>>;

    /// Resolves the capabilities declared directly on a facility.
    ///
    /// An absent facility identifier yields the empty set.
    async fn get_facility_capabilities(
        &self,
        facility_id: Option<&str>,
    ) -> AdapterResult<HashSet<String>>;

    /// Resolves the capabilities granted through the facility's resources to
    /// a caller holding the given groups.
    ///
    /// An empty group list or an absent facility identifier yields the empty
    /// set without a backend call.
    async fn get_resource_capabilities(
        &self,
        facility_id: Option<&str>,
        groups: &[Group],
    ) -> AdapterResult<HashSet<String>>;

    /// Resolves the values of the given canonical attribute names for a user,
    /// translated and type-coerced.
    ///
    /// Canonical names the translation table cannot resolve for this
    /// adapter's interface are silently absent from the result.
    async fn get_user_attributes_values(
        &self,
        user_id: &str,
        attributes: &[String],
    ) -> AdapterResult<HashMap<String, Value>>;
}
