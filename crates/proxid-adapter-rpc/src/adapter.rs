//! RPC-backed adapter implementation.
//!
//! Resolves users and user attributes over the management API. The
//! directory-only operations (facilities, groups, capabilities) answer with
//! explicit neutral values so the capability-set contract stays total.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use proxid_adapter::{AdapterKind, AdapterResult, AttributeMap, IdmAdapter};
use proxid_model::{Facility, Group, User};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::RpcSettings;
use crate::connector::{RpcConnector, RpcTransport};

const USERS_MANAGER: &str = "usersManager";
const ATTRIBUTES_MANAGER: &str = "attributesManager";

/// User name-part fields, concatenated in this order for the display name.
const NAME_PARTS: [&str; 5] = [
    "titleBefore",
    "firstName",
    "middleName",
    "lastName",
    "titleAfter",
];

/// A user attribute as the management API returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcAttribute {
    /// Numeric attribute identifier.
    pub id: i64,
    /// Wire name (`namespace:friendlyName`).
    pub name: String,
    /// Human-readable attribute name.
    pub display_name: String,
    /// Value type as declared by the backend.
    pub value_type: String,
    /// Raw attribute value.
    pub value: Value,
}

/// Wire shape of one attribute in a `getAttributes` response.
#[derive(Debug, Deserialize)]
struct WireAttribute {
    id: i64,
    namespace: String,
    #[serde(rename = "friendlyName")]
    friendly_name: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "type")]
    value_type: String,
    #[serde(default)]
    value: Value,
}

impl WireAttribute {
    fn wire_name(&self) -> String {
        format!("{}:{}", self.namespace, self.friendly_name)
    }
}

/// RPC-backed adapter.
///
/// Generic over the transport so adapter logic is testable without a live
/// backend; production code uses [`RpcConnector`].
pub struct RpcAdapter<T = RpcConnector> {
    attrmap: AttributeMap,
    transport: T,
}

impl RpcAdapter<RpcConnector> {
    /// Creates an adapter from the backend settings file.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the settings file or the attribute
    /// translation table cannot be loaded.
    pub fn from_settings_file(path: &Path) -> AdapterResult<Self> {
        let settings = RpcSettings::load(path)?;
        let attrmap = AttributeMap::load(&settings.attribute_map_file)?;
        let transport = RpcConnector::new(settings.rpc)?;

        Ok(Self::with_transport(attrmap, transport))
    }
}

impl<T: RpcTransport> RpcAdapter<T> {
    /// Creates an adapter over an explicit transport.
    #[must_use]
    pub const fn with_transport(attrmap: AttributeMap, transport: T) -> Self {
        Self { attrmap, transport }
    }

    /// Fetches the requested canonical attributes as the API returns them,
    /// keyed by canonical name.
    ///
    /// Canonical names the translation table cannot resolve for the RPC
    /// interface are silently absent; response attributes outside the
    /// requested set are skipped with a warning.
    pub async fn get_user_attributes(
        &self,
        user_id: &str,
        attributes: &[String],
    ) -> AdapterResult<HashMap<String, RpcAttribute>> {
        let wire_map = self.attrmap.wire_map(attributes, AdapterKind::Rpc);
        if wire_map.is_empty() {
            return Ok(HashMap::new());
        }

        let wire_names: Vec<&str> = wire_map.keys().map(String::as_str).collect();
        let params = vec![
            ("user".to_string(), json!(user_id)),
            ("attrNames".to_string(), json!(wire_names)),
        ];

        let response = self
            .transport
            .get(ATTRIBUTES_MANAGER, "getAttributes", &params)
            .await?;

        let Value::Array(items) = response else {
            warn!("unexpected getAttributes response shape, expected an array");
            return Ok(HashMap::new());
        };

        let mut result = HashMap::with_capacity(items.len());
        for item in items {
            let attribute: WireAttribute = match serde_json::from_value(item) {
                Ok(attribute) => attribute,
                Err(e) => {
                    warn!(error = %e, "skipping malformed attribute in getAttributes response");
                    continue;
                }
            };

            let wire_name = attribute.wire_name();
            let Some(target) = wire_map.get(&wire_name) else {
                warn!(attribute = %wire_name, "backend returned an attribute outside the requested set");
                continue;
            };

            result.insert(
                target.canonical.clone(),
                RpcAttribute {
                    id: attribute.id,
                    name: wire_name,
                    display_name: attribute.display_name,
                    value_type: attribute.value_type,
                    value: attribute.value,
                },
            );
        }

        Ok(result)
    }
}

#[async_trait]
impl<T: RpcTransport> IdmAdapter for RpcAdapter<T> {
    async fn get_user(&self, source_id: &str, logins: &[String]) -> AdapterResult<Option<User>> {
        for login in logins {
            let params = json!({
                "extSourceName": source_id,
                "extLogin": login,
            });

            let result = match self
                .transport
                .post(USERS_MANAGER, "getUserByExtSourceNameAndExtLogin", &params)
                .await
            {
                Ok(result) => result,
                // Remote and transport failures alike mean "try the next
                // candidate"; only exhausting all of them is a miss.
                Err(e) => {
                    debug!(login = %login, error = %e, "candidate login did not resolve");
                    continue;
                }
            };

            let Some(id) = identifier(result.get("id")) else {
                debug!(login = %login, "user record without an identifier");
                continue;
            };

            debug!(login = %login, "user found");
            return Ok(Some(User::new(id, compose_display_name(&result))));
        }

        debug!("no candidate login resolved to a user");
        Ok(None)
    }

    async fn get_facility_by_identifier(
        &self,
        _identifier: &str,
    ) -> AdapterResult<Option<Facility>> {
        debug!("facility resolution is not available over the rpc interface");
        Ok(None)
    }

    async fn get_user_groups_on_facility(
        &self,
        _user_id: &str,
        _facility_id: &str,
    ) -> AdapterResult<Vec<Group>> {
        debug!("group resolution is not available over the rpc interface");
        Ok(Vec::new())
    }

    async fn get_facility_capabilities(
        &self,
        _facility_id: Option<&str>,
    ) -> AdapterResult<HashSet<String>> {
        debug!("facility capabilities are not available over the rpc interface");
        Ok(HashSet::new())
    }

    async fn get_resource_capabilities(
        &self,
        _facility_id: Option<&str>,
        _groups: &[Group],
    ) -> AdapterResult<HashSet<String>> {
        debug!("resource capabilities are not available over the rpc interface");
        Ok(HashSet::new())
    }

    async fn get_user_attributes_values(
        &self,
        user_id: &str,
        attributes: &[String],
    ) -> AdapterResult<HashMap<String, Value>> {
        let wire_map = self.attrmap.wire_map(attributes, AdapterKind::Rpc);
        if wire_map.is_empty() {
            return Ok(HashMap::new());
        }

        let rich = self.get_user_attributes(user_id, attributes).await?;

        let mut values = HashMap::with_capacity(wire_map.len());
        for target in wire_map.values() {
            let raw = rich.get(&target.canonical).map(|attribute| &attribute.value);
            values.insert(target.canonical.clone(), target.value_type.coerce(raw));
        }

        Ok(values)
    }
}

/// Renders the backend's user identifier (a JSON number or string) as text.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Concatenates the name-part fields of a user record, skipping blank parts.
fn compose_display_name(record: &Value) -> Option<String> {
    let name = NAME_PARTS
        .iter()
        .filter_map(|part| record.get(*part).and_then(Value::as_str))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RpcError, RpcResult};
    use std::sync::Mutex;

    const ATTRIBUTE_MAP: &str = r"
internal_login:
  rpc: 'urn:attr:login'
  type: string
internal_groups:
  rpc: 'urn:attr:groupNames'
  type: list
internal_admin:
  rpc: 'urn:attr:isAdmin'
  type: bool
internal_mail:
  ldap: mail
  type: string
";

    /// Transport that replays canned responses and records every call.
    #[derive(Default)]
    struct MockRpc {
        responses: Mutex<Vec<RpcResult<Value>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockRpc {
        fn respond_with(responses: Vec<RpcResult<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn next_response(&self, manager: &str, method: &str) -> RpcResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((manager.to_string(), method.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(Value::Null))
        }
    }

    #[async_trait]
    impl RpcTransport for MockRpc {
        async fn get(
            &self,
            manager: &str,
            method: &str,
            _params: &[(String, Value)],
        ) -> RpcResult<Value> {
            self.next_response(manager, method)
        }

        async fn post(&self, manager: &str, method: &str, _params: &Value) -> RpcResult<Value> {
            self.next_response(manager, method)
        }
    }

    fn adapter(transport: MockRpc) -> RpcAdapter<MockRpc> {
        RpcAdapter::with_transport(AttributeMap::parse(ATTRIBUTE_MAP).unwrap(), transport)
    }

    fn wire_attribute(id: i64, namespace: &str, friendly: &str, value: Value) -> Value {
        json!({
            "id": id,
            "namespace": namespace,
            "friendlyName": friendly,
            "displayName": format!("Attribute {id}"),
            "type": "java.lang.Object",
            "value": value,
        })
    }

    #[tokio::test]
    async fn get_user_short_circuits_on_the_first_success() {
        let adapter = adapter(MockRpc::respond_with(vec![
            Err(RpcError::remote("User not found by ext login")),
            Ok(json!({
                "id": 42,
                "titleBefore": "Dr.",
                "firstName": "Jane",
                "middleName": null,
                "lastName": "Doe",
                "titleAfter": "  ",
            })),
        ]));

        let logins = vec!["loginA".to_string(), "loginB".to_string()];
        let user = adapter
            .get_user("https://idp.example.org", &logins)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.id, "42");
        assert_eq!(user.display_name(), Some("Dr. Jane Doe"));
        assert_eq!(adapter.transport.call_count(), 2);
    }

    #[tokio::test]
    async fn get_user_is_absent_when_every_candidate_fails() {
        let adapter = adapter(MockRpc::respond_with(vec![
            Err(RpcError::remote("User not found by ext login")),
            Err(RpcError::remote("User not found by ext login")),
        ]));

        let logins = vec!["loginA".to_string(), "loginB".to_string()];
        let user = adapter.get_user("idp", &logins).await.unwrap();

        assert!(user.is_none());
        assert_eq!(adapter.transport.call_count(), 2);
    }

    #[tokio::test]
    async fn get_user_swallows_transport_failures_per_candidate() {
        let adapter = adapter(MockRpc::respond_with(vec![
            Err(RpcError::remote("ServiceUnavailableException")),
            Ok(json!({"id": "7", "firstName": "Sam", "lastName": "Ng"})),
        ]));

        let logins = vec!["loginA".to_string(), "loginB".to_string()];
        let user = adapter.get_user("idp", &logins).await.unwrap().unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.display_name(), Some("Sam Ng"));
    }

    #[tokio::test]
    async fn get_user_with_blank_name_parts_has_no_display_name() {
        let adapter = adapter(MockRpc::respond_with(vec![Ok(json!({
            "id": 42,
            "titleBefore": "",
            "firstName": "   ",
            "lastName": null,
        }))]));

        let logins = vec!["loginA".to_string()];
        let user = adapter.get_user("idp", &logins).await.unwrap().unwrap();

        assert_eq!(user.display_name(), None);
    }

    #[tokio::test]
    async fn directory_only_operations_return_neutral_values() {
        let adapter = adapter(MockRpc::default());
        let group = Group::new("31", "5", "developers", None, "org:developers");

        assert!(adapter.get_facility_by_identifier("x").await.unwrap().is_none());
        assert!(adapter.get_user_groups_on_facility("42", "7").await.unwrap().is_empty());
        assert!(adapter.get_facility_capabilities(Some("7")).await.unwrap().is_empty());
        assert!(adapter
            .get_resource_capabilities(Some("7"), &[group])
            .await
            .unwrap()
            .is_empty());

        // Neutral answers never touch the transport.
        assert_eq!(adapter.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn rich_attributes_are_keyed_by_canonical_name() {
        let adapter = adapter(MockRpc::respond_with(vec![Ok(json!([
            wire_attribute(1, "urn:attr", "login", json!("jdoe")),
            wire_attribute(2, "urn:attr", "groupNames", json!(["dev", "ops"])),
            // Outside the requested set: skipped with a warning.
            wire_attribute(9, "urn:attr", "unexpected", json!("x")),
        ]))]));

        let requested = vec!["internal_login".to_string(), "internal_groups".to_string()];
        let rich = adapter.get_user_attributes("42", &requested).await.unwrap();

        assert_eq!(rich.len(), 2);
        let login = &rich["internal_login"];
        assert_eq!(login.id, 1);
        assert_eq!(login.name, "urn:attr:login");
        assert_eq!(login.display_name, "Attribute 1");
        assert_eq!(login.value, json!("jdoe"));
    }

    #[tokio::test]
    async fn attribute_values_coerce_by_declared_type() {
        let adapter = adapter(MockRpc::respond_with(vec![Ok(json!([
            wire_attribute(1, "urn:attr", "login", json!("jdoe")),
            wire_attribute(2, "urn:attr", "groupNames", json!(["dev", "ops"])),
            wire_attribute(3, "urn:attr", "isAdmin", Value::Null),
        ]))]));

        let requested = vec![
            "internal_login".to_string(),
            "internal_groups".to_string(),
            "internal_admin".to_string(),
            // Only mapped for the directory interface; silently absent.
            "internal_mail".to_string(),
        ];
        let values = adapter
            .get_user_attributes_values("42", &requested)
            .await
            .unwrap();

        assert_eq!(values["internal_login"], json!("jdoe"));
        assert_eq!(values["internal_groups"], json!(["dev", "ops"]));
        assert_eq!(values["internal_admin"], json!(false));
        assert!(!values.contains_key("internal_mail"));
    }

    #[tokio::test]
    async fn nothing_translatable_skips_the_call() {
        let adapter = adapter(MockRpc::default());

        let requested = vec!["internal_mail".to_string()];
        let values = adapter.get_user_attributes_values("42", &requested).await.unwrap();

        assert!(values.is_empty());
        assert_eq!(adapter.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_errors_propagate_outside_the_candidate_loop() {
        let adapter = adapter(MockRpc::respond_with(vec![Err(RpcError::remote(
            "PrivilegeException",
        ))]));

        let requested = vec!["internal_login".to_string()];
        let err = adapter
            .get_user_attributes_values("42", &requested)
            .await
            .unwrap_err();

        assert!(err.is_remote_error());
    }
}
