//! Directory-backed adapter implementation.
//!
//! Implements the full capability set as directory searches. Query shapes
//! follow the backend's published directory schema: `idmUser`, `idmFacility`,
//! `idmResource`, and `idmGroup` entries under one base DN, with user entries
//! in an `ou=People` subtree.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use proxid_adapter::{AdapterKind, AdapterResult, AttributeMap, IdmAdapter};
use proxid_model::{Facility, Group, User};
use serde_json::Value;
use tracing::warn;

use crate::config::{LdapConfig, LdapSettings};
use crate::connector::{DirEntry, DirectoryTransport, LdapConnector};
use crate::error::LdapResult;
use crate::filter::Filter;

// Directory schema: object classes.
const OC_USER: &str = "idmUser";
const OC_FACILITY: &str = "idmFacility";
const OC_RESOURCE: &str = "idmResource";
const OC_GROUP: &str = "idmGroup";

// Directory schema: entity attributes.
const ATTR_USER_ID: &str = "idmUserId";
const ATTR_FACILITY_ID: &str = "idmFacilityId";
const ATTR_RESOURCE_ID: &str = "idmResourceId";
const ATTR_GROUP_ID: &str = "idmGroupId";
const ATTR_ORG_ID: &str = "idmOrgId";
const ATTR_UNIQUE_GROUP_NAME: &str = "idmUniqueGroupName";
const ATTR_FACILITY_DN: &str = "idmFacilityDn";
const ATTR_ASSIGNED_RESOURCE: &str = "assignedToResourceId";
const ATTR_ASSIGNED_GROUP: &str = "assignedGroupId";
const ATTR_CAPABILITIES: &str = "capabilities";
const ATTR_MEMBER: &str = "uniqueMember";
const ATTR_ENTITY_ID: &str = "entityID";
const ATTR_CLIENT_ID: &str = "OIDCClientID";
const ATTR_DISPLAY_NAME: &str = "displayName";
const ATTR_COMMON_NAME: &str = "cn";
const ATTR_DESCRIPTION: &str = "description";

/// Directory-backed adapter.
///
/// Generic over the transport so adapter logic is testable without a
/// directory server; production code uses [`LdapConnector`].
pub struct LdapAdapter<T = LdapConnector> {
    config: LdapConfig,
    attrmap: AttributeMap,
    transport: T,
}

impl LdapAdapter<LdapConnector> {
    /// Creates an adapter from the backend settings file.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the settings file or the attribute
    /// translation table cannot be loaded.
    pub fn from_settings_file(path: &Path) -> AdapterResult<Self> {
        let settings = LdapSettings::load(path)?;
        let attrmap = AttributeMap::load(&settings.attribute_map_file)?;
        let transport = LdapConnector::new(settings.ldap.clone());

        Ok(Self::with_transport(settings.ldap, attrmap, transport))
    }
}

impl<T: DirectoryTransport> LdapAdapter<T> {
    /// Creates an adapter over an explicit transport.
    #[must_use]
    pub const fn with_transport(config: LdapConfig, attrmap: AttributeMap, transport: T) -> Self {
        Self {
            config,
            attrmap,
            transport,
        }
    }

    /// Softens directory-unavailability errors to a neutral result.
    ///
    /// Enrichment must degrade, not fail, when the directory is down; every
    /// operation of this adapter has a valid absent/empty outcome to fall
    /// back to.
    fn soften<V>(result: LdapResult<V>, neutral: V, operation: &str) -> AdapterResult<V> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_connection_error() => {
                warn!(operation, error = %e, "directory unavailable, returning empty result");
                Ok(neutral)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// DN of a user entry, as referenced by group membership values.
    fn user_dn(&self, user_id: &str) -> String {
        format!("{ATTR_USER_ID}={user_id},{}", self.config.people_base())
    }

    /// DN of a facility entry, as referenced by resource entries.
    fn facility_dn(&self, facility_id: &str) -> String {
        format!("{ATTR_FACILITY_ID}={facility_id},{}", self.config.base_dn)
    }

    /// Filter matching all resources bound to a facility.
    fn facility_resources_filter(&self, facility_id: &str) -> Filter {
        Filter::and(vec![
            Filter::object_class(OC_RESOURCE),
            Filter::eq(ATTR_FACILITY_DN, self.facility_dn(facility_id)),
        ])
    }

    fn group_from_entry(entry: &DirEntry) -> Option<Group> {
        let id = entry.first(ATTR_GROUP_ID);
        let org_id = entry.first(ATTR_ORG_ID);
        let name = entry.first(ATTR_COMMON_NAME);
        let unique_name = entry.first(ATTR_UNIQUE_GROUP_NAME);

        let (Some(id), Some(org_id), Some(name), Some(unique_name)) =
            (id, org_id, name, unique_name)
        else {
            warn!(dn = %entry.dn, "skipping malformed group entry");
            return None;
        };

        Some(Group::new(
            id,
            org_id,
            name,
            entry.first(ATTR_DESCRIPTION).map(String::from),
            unique_name,
        ))
    }
}

#[async_trait]
impl<T: DirectoryTransport> IdmAdapter for LdapAdapter<T> {
    async fn get_user(&self, _source_id: &str, logins: &[String]) -> AdapterResult<Option<User>> {
        if logins.is_empty() {
            return Ok(None);
        }

        let filter = Filter::or(
            logins
                .iter()
                .map(|login| Filter::eq(self.config.login_attribute.as_str(), login.as_str()))
                .collect(),
        );

        let entry = Self::soften(
            self.transport
                .search_one(
                    &self.config.people_base(),
                    &filter,
                    &[ATTR_USER_ID, ATTR_DISPLAY_NAME, ATTR_COMMON_NAME],
                )
                .await,
            None,
            "get_user",
        )?;

        let Some(entry) = entry else {
            return Ok(None);
        };
        let Some(id) = entry.first(ATTR_USER_ID) else {
            warn!(dn = %entry.dn, "user entry lacks an identifier");
            return Ok(None);
        };

        // Structured display name first, generic common name as fallback.
        let display_name = [ATTR_DISPLAY_NAME, ATTR_COMMON_NAME]
            .iter()
            .filter_map(|attr| entry.first(attr))
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(String::from);

        Ok(Some(User::new(id, display_name)))
    }

    async fn get_facility_by_identifier(
        &self,
        identifier: &str,
    ) -> AdapterResult<Option<Facility>> {
        let filter = Filter::and(vec![
            Filter::object_class(OC_FACILITY),
            Filter::or(vec![
                Filter::eq(ATTR_ENTITY_ID, identifier),
                Filter::eq(ATTR_CLIENT_ID, identifier),
            ]),
        ]);

        let entry = Self::soften(
            self.transport
                .search_one(
                    &self.config.base_dn,
                    &filter,
                    &[ATTR_FACILITY_ID, ATTR_COMMON_NAME, ATTR_DESCRIPTION],
                )
                .await,
            None,
            "get_facility_by_identifier",
        )?;

        let Some(entry) = entry else {
            return Ok(None);
        };
        let Some(id) = entry.first(ATTR_FACILITY_ID) else {
            warn!(dn = %entry.dn, "facility entry lacks an identifier");
            return Ok(None);
        };

        Ok(Some(Facility::new(
            id,
            entry.first(ATTR_COMMON_NAME).unwrap_or_default(),
            entry.first(ATTR_DESCRIPTION).map(String::from),
            identifier,
        )))
    }

    async fn get_user_groups_on_facility(
        &self,
        user_id: &str,
        facility_id: &str,
    ) -> AdapterResult<Vec<Group>> {
        // Stage 1: the facility's resources.
        let resources = Self::soften(
            self.transport
                .search_many(
                    &self.config.base_dn,
                    &self.facility_resources_filter(facility_id),
                    &[ATTR_RESOURCE_ID],
                )
                .await,
            Vec::new(),
            "get_user_groups_on_facility",
        )?;

        let resource_terms: Vec<Filter> = resources
            .iter()
            .filter_map(|resource| resource.first(ATTR_RESOURCE_ID))
            .map(|resource_id| Filter::eq(ATTR_ASSIGNED_RESOURCE, resource_id))
            .collect();

        if resource_terms.is_empty() {
            return Ok(Vec::new());
        }

        // Stage 2: groups holding the user that are assigned to any of them.
        let filter = Filter::and(vec![
            Filter::object_class(OC_GROUP),
            Filter::eq(ATTR_MEMBER, self.user_dn(user_id)),
            Filter::or(resource_terms),
        ]);

        let entries = Self::soften(
            self.transport
                .search_many(
                    &self.config.base_dn,
                    &filter,
                    &[
                        ATTR_GROUP_ID,
                        ATTR_ORG_ID,
                        ATTR_COMMON_NAME,
                        ATTR_UNIQUE_GROUP_NAME,
                        ATTR_DESCRIPTION,
                    ],
                )
                .await,
            Vec::new(),
            "get_user_groups_on_facility",
        )?;

        Ok(entries.iter().filter_map(Self::group_from_entry).collect())
    }

    async fn get_facility_capabilities(
        &self,
        facility_id: Option<&str>,
    ) -> AdapterResult<HashSet<String>> {
        let Some(facility_id) = facility_id else {
            return Ok(HashSet::new());
        };

        let filter = Filter::and(vec![
            Filter::object_class(OC_FACILITY),
            Filter::eq(ATTR_FACILITY_ID, facility_id),
        ]);

        let entry = Self::soften(
            self.transport
                .search_one(&self.config.base_dn, &filter, &[ATTR_CAPABILITIES])
                .await,
            None,
            "get_facility_capabilities",
        )?;

        Ok(entry.map_or_else(HashSet::new, |e| {
            e.values(ATTR_CAPABILITIES).iter().cloned().collect()
        }))
    }

    async fn get_resource_capabilities(
        &self,
        facility_id: Option<&str>,
        groups: &[Group],
    ) -> AdapterResult<HashSet<String>> {
        let Some(facility_id) = facility_id else {
            return Ok(HashSet::new());
        };
        if groups.is_empty() {
            return Ok(HashSet::new());
        }

        let resources = Self::soften(
            self.transport
                .search_many(
                    &self.config.base_dn,
                    &self.facility_resources_filter(facility_id),
                    &[ATTR_CAPABILITIES, ATTR_ASSIGNED_GROUP],
                )
                .await,
            Vec::new(),
            "get_resource_capabilities",
        )?;

        let group_ids: HashSet<&str> = groups.iter().map(|group| group.id.as_str()).collect();
        let mut capabilities = HashSet::new();

        for resource in &resources {
            let assigned = resource.values(ATTR_ASSIGNED_GROUP);
            if assigned.iter().any(|id| group_ids.contains(id.as_str())) {
                capabilities.extend(resource.values(ATTR_CAPABILITIES).iter().cloned());
            }
        }

        Ok(capabilities)
    }

    async fn get_user_attributes_values(
        &self,
        user_id: &str,
        attributes: &[String],
    ) -> AdapterResult<HashMap<String, Value>> {
        let wire_map = self.attrmap.wire_map(attributes, AdapterKind::Ldap);
        if wire_map.is_empty() {
            return Ok(HashMap::new());
        }

        let wire_names: Vec<&str> = wire_map.keys().map(String::as_str).collect();
        let filter = Filter::and(vec![
            Filter::object_class(OC_USER),
            Filter::eq(ATTR_USER_ID, user_id),
        ]);

        let entry = Self::soften(
            self.transport
                .search_one(&self.config.base_dn, &filter, &wire_names)
                .await,
            None,
            "get_user_attributes_values",
        )?;

        let mut values = HashMap::with_capacity(wire_map.len());
        for (wire_name, target) in &wire_map {
            // An unknown user (or an outage, softened above) leaves every
            // attribute absent; coercion then supplies the typed default.
            let raw = entry
                .as_ref()
                .and_then(|e| e.attributes.get(wire_name))
                .map(|raw_values| {
                    Value::Array(raw_values.iter().cloned().map(Value::String).collect())
                });

            values.insert(target.canonical.clone(), target.value_type.coerce(raw.as_ref()));
        }

        Ok(values)
    }
}
