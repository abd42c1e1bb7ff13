//! RPC connection configuration.
//!
//! The RPC settings live in the `rpc` section of the backend settings file
//! (shared with the directory section):
//!
//! ```yaml
//! rpc:
//!   base_url: https://idm.example.org/rpc/
//!   user: proxy
//!   password: secret
//! attribute_map_file: /etc/proxid/attribute_map.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RpcError, RpcResult};

/// RPC connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Base URL of the management API.
    pub base_url: String,

    /// Basic-auth user.
    pub user: String,

    /// Basic-auth password.
    #[serde(skip_serializing)]
    pub password: String,
}

impl RpcConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> RpcResult<()> {
        if self.base_url.is_empty() {
            return Err(RpcError::config("base_url cannot be empty"));
        }
        if self.user.is_empty() {
            return Err(RpcError::config("user cannot be empty"));
        }
        Ok(())
    }

    /// URL of one read/write call, `{base}/json/{manager}/{method}`.
    #[must_use]
    pub fn call_url(&self, manager: &str, method: &str) -> String {
        format!(
            "{}/json/{manager}/{method}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// The RPC adapter's view of the backend settings file.
#[derive(Debug, Deserialize)]
pub struct RpcSettings {
    /// RPC connection settings.
    pub rpc: RpcConfig,

    /// Path of the attribute translation table.
    pub attribute_map_file: PathBuf,
}

impl RpcSettings {
    /// Loads and validates RPC settings from the backend settings file.
    ///
    /// ## Errors
    ///
    /// Returns `RpcError::Configuration` if the file is unreadable, the `rpc`
    /// section is missing or malformed, or validation fails.
    pub fn load(path: &Path) -> RpcResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            RpcError::config(format!("cannot read settings file {}: {e}", path.display()))
        })?;

        let settings: Self = serde_yaml::from_str(&text)
            .map_err(|e| RpcError::config(format!("invalid rpc settings: {e}")))?;
        settings.rpc.validate()?;

        Ok(settings)
    }
}
