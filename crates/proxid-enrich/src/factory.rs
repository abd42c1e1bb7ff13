//! Adapter factory.
//!
//! The concrete backend adapter is chosen by the `interface` configuration
//! value and constructed from the shared backend settings file; the rest of
//! the step only ever sees the capability-set trait object.

use std::path::Path;
use std::sync::Arc;

use proxid_adapter::{AdapterKind, IdmAdapter};
use proxid_adapter_ldap::LdapAdapter;
use proxid_adapter_rpc::RpcAdapter;
use tracing::debug;

use crate::error::EnrichResult;

/// Creates the adapter for an interface from the backend settings file.
///
/// ## Errors
///
/// Returns `EnrichError::Adapter` when the settings file or the attribute
/// translation table cannot be loaded.
pub fn create_adapter(
    interface: AdapterKind,
    settings_file: &Path,
) -> EnrichResult<Arc<dyn IdmAdapter>> {
    debug!(interface = interface.as_str(), "creating backend adapter");

    let adapter: Arc<dyn IdmAdapter> = match interface {
        AdapterKind::Ldap => Arc::new(LdapAdapter::from_settings_file(settings_file)?),
        AdapterKind::Rpc => Arc::new(RpcAdapter::from_settings_file(settings_file)?),
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use proxid_adapter::AdapterError;
    use std::io::Write as _;

    const SETTINGS: &str = r"
ldap:
  hostnames: [ldaps://idm.example.org]
  base_dn: dc=idm,dc=example,dc=org
  bind_dn: uid=proxy,dc=idm,dc=example,dc=org
  bind_password: secret
rpc:
  base_url: https://idm.example.org/rpc/
  user: proxy
  password: secret
";

    const ATTRIBUTE_MAP: &str = r"
internal_display_name:
  ldap: displayName
  rpc: 'urn:attr:displayName'
  type: string
";

    fn settings_file() -> (tempfile::NamedTempFile, tempfile::NamedTempFile) {
        let mut attribute_map = tempfile::NamedTempFile::new().unwrap();
        write!(attribute_map, "{ATTRIBUTE_MAP}").unwrap();

        let mut settings = tempfile::NamedTempFile::new().unwrap();
        write!(settings, "{SETTINGS}").unwrap();
        writeln!(
            settings,
            "attribute_map_file: {}",
            attribute_map.path().display()
        )
        .unwrap();

        (settings, attribute_map)
    }

    #[test]
    fn constructs_both_adapter_kinds() {
        let (settings, _attribute_map) = settings_file();

        assert!(create_adapter(AdapterKind::Ldap, settings.path()).is_ok());
        assert!(create_adapter(AdapterKind::Rpc, settings.path()).is_ok());
    }

    #[test]
    fn missing_settings_file_is_a_configuration_error() {
        let err = create_adapter(AdapterKind::Ldap, Path::new("/nonexistent/backend.yaml"))
            .err()
            .unwrap();

        assert!(matches!(
            err,
            EnrichError::Adapter(AdapterError::Configuration(_))
        ));
    }
}
