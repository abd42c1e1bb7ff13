//! Enrichment step configuration.
//!
//! The host pipeline hands this step one YAML section:
//!
//! ```yaml
//! interface: ldap
//! idm_config_file_name: /etc/proxid/backend.yaml
//! uids_identifiers:
//!   - edupersonuniqueid
//!   - edupersonprincipalname
//! mode: PARTIAL
//! attr_map:
//!   internal_display_name: cn
//!   internal_groups:
//!     - groups
//!     - member_of
//! ```
//!
//! `uids_identifiers` names the bag fields the upstream identity-resolution
//! step probes for candidate logins; it is carried here so one section
//! configures the whole backend integration, and this step itself only reads
//! the already-resolved user identifier.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use proxid_adapter::AdapterKind;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{EnrichError, EnrichResult};

/// Attribute-selection mode of the enrichment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fetch every attribute named in the output map.
    #[default]
    Full,

    /// Fetch only attributes whose output targets are not already usefully
    /// populated upstream.
    Partial,
}

impl Mode {
    /// Parses a mode name, case-insensitively.
    ///
    /// Anything other than `FULL`/`PARTIAL` falls back to [`Mode::Full`]
    /// with a warning.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.to_ascii_uppercase().as_str() {
            "FULL" => Self::Full,
            "PARTIAL" => Self::Partial,
            other => {
                warn!(mode = other, "unrecognized enrichment mode, falling back to FULL");
                Self::Full
            }
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

/// Enrichment step configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichConfig {
    /// Backend interface to resolve attributes over.
    #[serde(default)]
    pub interface: AdapterKind,

    /// Bag fields holding candidate login identifiers, consumed by the
    /// upstream identity-resolution step.
    #[serde(default)]
    pub uids_identifiers: Vec<String>,

    /// Path of the backend settings file for the selected interface.
    pub idm_config_file_name: PathBuf,

    /// Attribute-selection mode.
    #[serde(default)]
    pub mode: Mode,

    /// Canonical attribute name → output name(s).
    ///
    /// Values stay untyped: a malformed entry is reported per attribute at
    /// write time, not at load time.
    #[serde(default)]
    pub attr_map: Option<HashMap<String, Value>>,
}

impl EnrichConfig {
    /// Loads the step configuration from a YAML file.
    ///
    /// ## Errors
    ///
    /// Returns `EnrichError::Configuration` if the file is unreadable or
    /// malformed.
    pub fn load(path: &Path) -> EnrichResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            EnrichError::config(format!("cannot read step config {}: {e}", path.display()))
        })?;

        serde_yaml::from_str(&text)
            .map_err(|e| EnrichError::config(format!("invalid step config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(Mode::parse("FULL"), Mode::Full);
        assert_eq!(Mode::parse("partial"), Mode::Partial);
        assert_eq!(Mode::parse("Partial"), Mode::Partial);
    }

    #[test]
    fn unrecognized_mode_falls_back_to_full() {
        assert_eq!(Mode::parse("INCREMENTAL"), Mode::Full);
        assert_eq!(Mode::parse(""), Mode::Full);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let yaml = "idm_config_file_name: /etc/proxid/backend.yaml\n";
        let config: EnrichConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.interface, AdapterKind::Rpc);
        assert_eq!(config.mode, Mode::Full);
        assert!(config.uids_identifiers.is_empty());
        assert!(config.attr_map.is_none());
    }

    #[test]
    fn config_deserializes_fully() {
        let yaml = r"
interface: ldap
idm_config_file_name: /etc/proxid/backend.yaml
uids_identifiers:
  - edupersonuniqueid
mode: partial
attr_map:
  internal_display_name: cn
  internal_groups: [groups, member_of]
";
        let config: EnrichConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.interface, AdapterKind::Ldap);
        assert_eq!(config.mode, Mode::Partial);
        assert_eq!(config.uids_identifiers, ["edupersonuniqueid"]);

        let attr_map = config.attr_map.unwrap();
        assert_eq!(attr_map["internal_display_name"], Value::String("cn".to_string()));
    }

    #[test]
    fn config_requires_the_settings_path() {
        let result = serde_yaml::from_str::<EnrichConfig>("mode: FULL\n");
        assert!(result.is_err());
    }
}
