//! Directory connection configuration.
//!
//! The directory settings live in the `ldap` section of the backend settings
//! file (shared with the RPC section), next to the path of the attribute
//! translation table:
//!
//! ```yaml
//! ldap:
//!   hostnames:
//!     - ldaps://idm1.example.org
//!     - ldaps://idm2.example.org
//!   base_dn: dc=idm,dc=example,dc=org
//!   bind_dn: uid=proxy,ou=services,dc=idm,dc=example,dc=org
//!   bind_password: secret
//! attribute_map_file: /etc/proxid/attribute_map.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LdapError, LdapResult};

/// Directory connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Directory server URLs, tried in order until one accepts a connection.
    pub hostnames: Vec<String>,

    /// Base distinguished name of the backend's directory tree.
    pub base_dn: String,

    /// Bind DN of the service account.
    pub bind_dn: String,

    /// Bind credential (password).
    #[serde(skip_serializing)]
    pub bind_password: String,

    /// Attribute holding external login identifiers on user entries.
    #[serde(default = "default_login_attribute")]
    pub login_attribute: String,

    /// Connect timeout in seconds per server attempt.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_login_attribute() -> String {
    "eduPersonPrincipalNames".to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

impl LdapConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> LdapResult<()> {
        if self.hostnames.is_empty() {
            return Err(LdapError::config("hostnames cannot be empty"));
        }
        if self.base_dn.is_empty() {
            return Err(LdapError::config("base_dn cannot be empty"));
        }
        if self.bind_dn.is_empty() {
            return Err(LdapError::config("bind_dn cannot be empty"));
        }
        Ok(())
    }

    /// Returns the connect timeout per server attempt.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the base DN of the people subtree holding user entries.
    #[must_use]
    pub fn people_base(&self) -> String {
        format!("ou=People,{}", self.base_dn)
    }
}

/// The directory adapter's view of the backend settings file.
#[derive(Debug, Deserialize)]
pub struct LdapSettings {
    /// Directory connection settings.
    pub ldap: LdapConfig,

    /// Path of the attribute translation table.
    pub attribute_map_file: PathBuf,
}

impl LdapSettings {
    /// Loads and validates directory settings from the backend settings file.
    ///
    /// ## Errors
    ///
    /// Returns `LdapError::Configuration` if the file is unreadable, the
    /// `ldap` section is missing or malformed, or validation fails.
    pub fn load(path: &Path) -> LdapResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            LdapError::config(format!("cannot read settings file {}: {e}", path.display()))
        })?;

        let settings: Self = serde_yaml::from_str(&text)
            .map_err(|e| LdapError::config(format!("invalid directory settings: {e}")))?;
        settings.ldap.validate()?;

        Ok(settings)
    }
}
