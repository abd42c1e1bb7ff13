//! Attribute translation table.
//!
//! A YAML file maps every canonical internal attribute name onto its
//! per-interface wire name and a declared value type:
//!
//! ```yaml
//! internal_display_name:
//!   ldap: displayName
//!   rpc: urn:attribute:def:user:displayName
//!   type: string
//! ```
//!
//! An entry may omit an interface key; the canonical name is then unusable
//! on that interface and resolution skips it with a warning. A missing or
//! unknown canonical name is handled the same way — translation never fails
//! a request on its own.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{AdapterError, AdapterResult};
use crate::provider::AdapterKind;

// ============================================================================
// Declared Value Types
// ============================================================================

/// Declared value type of a translation-table entry.
///
/// The type drives coercion of raw backend results into canonical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Boolean flag; absent coerces to `false`.
    Bool,
    /// Multi-valued sequence; absent coerces to the empty sequence.
    List,
    /// Single string value.
    String,
    /// Single integer value.
    Integer,
    /// String-keyed mapping; absent coerces to the empty mapping.
    Map,
}

impl AttributeType {
    /// Coerces a raw backend value into the canonical value for this type.
    ///
    /// JSON `null` counts as absent. Directory results arrive as sequences,
    /// so scalar-typed names take the first element; a transport that already
    /// delivers a scalar passes it through unchanged.
    #[must_use]
    pub fn coerce(&self, raw: Option<&Value>) -> Value {
        let present = raw.filter(|v| !v.is_null());
        match (self, present) {
            (Self::Bool, None) => Value::Bool(false),
            (Self::List, None) => Value::Array(Vec::new()),
            (Self::Map, None) => Value::Object(serde_json::Map::new()),
            (Self::List | Self::Map, Some(value)) => value.clone(),
            (_, Some(Value::Array(items))) => items.first().cloned().unwrap_or(Value::Null),
            (_, Some(value)) => value.clone(),
            (_, None) => Value::Null,
        }
    }
}

// ============================================================================
// Translation Entries
// ============================================================================

/// One translation-table entry: per-interface wire names plus the declared
/// value type.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeEntry {
    /// Wire name on the directory interface, if the attribute exists there.
    #[serde(default)]
    pub ldap: Option<String>,

    /// Wire name on the RPC interface, if the attribute exists there.
    #[serde(default)]
    pub rpc: Option<String>,

    /// Declared value type.
    #[serde(rename = "type")]
    pub value_type: AttributeType,
}

impl AttributeEntry {
    /// Gets the wire name for an interface, if declared.
    #[must_use]
    pub fn wire_name(&self, interface: AdapterKind) -> Option<&str> {
        match interface {
            AdapterKind::Ldap => self.ldap.as_deref(),
            AdapterKind::Rpc => self.rpc.as_deref(),
        }
    }
}

/// Reverse-lookup target of a wire name: the canonical name it translates
/// back to and the declared type used for coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireTarget {
    /// Canonical internal attribute name.
    pub canonical: String,
    /// Declared value type of the entry.
    pub value_type: AttributeType,
}

// ============================================================================
// Attribute Map
// ============================================================================

/// The loaded translation table, read-only after construction.
#[derive(Debug, Clone)]
pub struct AttributeMap {
    entries: HashMap<String, AttributeEntry>,
}

impl AttributeMap {
    /// Loads the translation table from a YAML file.
    ///
    /// ## Errors
    ///
    /// Returns `AdapterError::Configuration` if the file is unreadable,
    /// unparsable, or contains no entries.
    pub fn load(path: &Path) -> AdapterResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            AdapterError::config(format!("cannot read attribute map {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Parses the translation table from YAML text.
    ///
    /// ## Errors
    ///
    /// Returns `AdapterError::Configuration` on invalid YAML or an empty
    /// table.
    pub fn parse(text: &str) -> AdapterResult<Self> {
        let entries: HashMap<String, AttributeEntry> = serde_yaml::from_str(text)
            .map_err(|e| AdapterError::config(format!("invalid attribute map: {e}")))?;

        if entries.is_empty() {
            return Err(AdapterError::config("attribute map contains no entries"));
        }

        Ok(Self { entries })
    }

    /// Resolves the wire name of a canonical attribute on an interface.
    ///
    /// Logs a warning and returns `None` when the canonical name is unknown
    /// or has no wire name declared for the interface.
    #[must_use]
    pub fn wire_name(&self, canonical: &str, interface: AdapterKind) -> Option<&str> {
        let Some(entry) = self.entries.get(canonical) else {
            warn!(attribute = canonical, "canonical attribute missing from the attribute map");
            return None;
        };

        let wire = entry.wire_name(interface);
        if wire.is_none() {
            warn!(
                attribute = canonical,
                interface = interface.as_str(),
                "attribute has no wire name for this interface"
            );
        }
        wire
    }

    /// Builds the wire-name → canonical-target map for a batch of canonical
    /// names on one interface, skipping names that fail resolution.
    #[must_use]
    pub fn wire_map(
        &self,
        canonicals: &[String],
        interface: AdapterKind,
    ) -> HashMap<String, WireTarget> {
        let mut map = HashMap::with_capacity(canonicals.len());

        for canonical in canonicals {
            if let Some(wire) = self.wire_name(canonical, interface) {
                let entry = &self.entries[canonical];
                map.insert(
                    wire.to_string(),
                    WireTarget {
                        canonical: canonical.clone(),
                        value_type: entry.value_type,
                    },
                );
            }
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const TABLE: &str = r"
internal_login:
  ldap: loginAttr
  rpc: urn:attr:login
  type: string
internal_groups:
  ldap: groupNames
  rpc: urn:attr:groupNames
  type: list
internal_admin:
  rpc: urn:attr:isAdmin
  type: bool
internal_quota:
  ldap: quotas
  type: map
";

    fn table() -> AttributeMap {
        AttributeMap::parse(TABLE).unwrap()
    }

    #[test]
    fn wire_name_resolution_is_the_table_inverse() {
        let map = table();

        assert_eq!(map.wire_name("internal_login", AdapterKind::Ldap), Some("loginAttr"));
        assert_eq!(map.wire_name("internal_login", AdapterKind::Rpc), Some("urn:attr:login"));
        assert_eq!(map.wire_name("internal_admin", AdapterKind::Rpc), Some("urn:attr:isAdmin"));
    }

    #[test]
    fn unresolvable_names_warn_and_return_none() {
        let map = table();

        // Unknown canonical name.
        assert_eq!(map.wire_name("no_such_attribute", AdapterKind::Ldap), None);
        // Known canonical name without a wire name on this interface.
        assert_eq!(map.wire_name("internal_admin", AdapterKind::Ldap), None);
        assert_eq!(map.wire_name("internal_quota", AdapterKind::Rpc), None);
    }

    #[test]
    fn wire_map_skips_failed_resolutions() {
        let map = table();
        let requested = vec![
            "internal_login".to_string(),
            "internal_admin".to_string(),
            "no_such_attribute".to_string(),
        ];

        let wire = map.wire_map(&requested, AdapterKind::Ldap);

        assert_eq!(wire.len(), 1);
        let target = &wire["loginAttr"];
        assert_eq!(target.canonical, "internal_login");
        assert_eq!(target.value_type, AttributeType::String);
    }

    #[test]
    fn coercion_defaults_for_absent_values() {
        assert_eq!(AttributeType::Bool.coerce(None), Value::Bool(false));
        assert_eq!(AttributeType::List.coerce(None), serde_json::json!([]));
        assert_eq!(AttributeType::Map.coerce(None), serde_json::json!({}));
        assert_eq!(AttributeType::String.coerce(None), Value::Null);
        assert_eq!(AttributeType::Integer.coerce(None), Value::Null);
    }

    #[test]
    fn coercion_treats_null_as_absent() {
        assert_eq!(AttributeType::Bool.coerce(Some(&Value::Null)), Value::Bool(false));
        assert_eq!(AttributeType::List.coerce(Some(&Value::Null)), serde_json::json!([]));
        assert_eq!(AttributeType::Integer.coerce(Some(&Value::Null)), Value::Null);
    }

    #[test]
    fn coercion_of_present_values() {
        let seq = serde_json::json!(["a", "b", "c"]);

        // List-typed keeps the full sequence, scalar-typed takes the head.
        assert_eq!(AttributeType::List.coerce(Some(&seq)), seq);
        assert_eq!(AttributeType::String.coerce(Some(&seq)), serde_json::json!("a"));
        assert_eq!(
            AttributeType::Integer.coerce(Some(&serde_json::json!([7, 8]))),
            serde_json::json!(7)
        );
        assert_eq!(
            AttributeType::Bool.coerce(Some(&serde_json::json!([true]))),
            Value::Bool(true)
        );

        // Already-scalar values pass through unchanged.
        assert_eq!(
            AttributeType::String.coerce(Some(&serde_json::json!("x"))),
            serde_json::json!("x")
        );

        // Mappings pass through whole.
        let mapping = serde_json::json!({"bucket": "10G"});
        assert_eq!(AttributeType::Map.coerce(Some(&mapping)), mapping);
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = AttributeMap::load(Path::new("/nonexistent/attribute_map.yaml")).unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }

    #[test]
    fn load_rejects_empty_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let err = AttributeMap::load(file.path()).unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }

    #[test]
    fn load_reads_a_valid_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{TABLE}").unwrap();

        let map = AttributeMap::load(file.path()).unwrap();
        assert_eq!(map.wire_name("internal_groups", AdapterKind::Ldap), Some("groupNames"));
    }
}
