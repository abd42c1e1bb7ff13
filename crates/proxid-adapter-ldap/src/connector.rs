//! Directory transport.
//!
//! One connection per search: connect to the first reachable configured
//! server, bind with the service account, run the search, unbind. The
//! adapter issues at most a handful of searches per pipeline invocation, and
//! independent invocations stay fully isolated from each other this way.

use std::collections::HashMap;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, warn};

use crate::config::LdapConfig;
use crate::error::{LdapError, LdapResult};
use crate::filter::Filter;

/// A directory entry with its requested attributes.
///
/// Directory attribute values are always multi-valued text sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Distinguished name.
    pub dn: String,

    /// Attributes by wire name.
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirEntry {
    /// Creates an entry from an `ldap3` search result.
    #[must_use]
    pub fn from_search_entry(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs,
        }
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets all values of an attribute; empty when the entry lacks it.
    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes.get(name).map_or(&[], Vec::as_slice)
    }
}

/// Directory search operations as the adapter consumes them.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    /// Returns the best match for a filter, or `None` when nothing matches.
    async fn search_one(
        &self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> LdapResult<Option<DirEntry>>;

    /// Returns every match for a filter; empty when nothing matches.
    async fn search_many(
        &self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> LdapResult<Vec<DirEntry>>;
}

/// Directory transport backed by `ldap3`.
pub struct LdapConnector {
    config: LdapConfig,
}

impl LdapConnector {
    /// Creates a new connector.
    #[must_use]
    pub const fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    /// Connects to the first reachable configured server and binds the
    /// service account.
    async fn connect(&self) -> LdapResult<Ldap> {
        let mut last_error = None;

        for hostname in &self.config.hostnames {
            let settings = LdapConnSettings::new().set_conn_timeout(self.config.connect_timeout());

            match LdapConnAsync::with_settings(settings, hostname).await {
                Ok((conn, mut ldap)) => {
                    tokio::spawn(async move {
                        if let Err(e) = conn.drive().await {
                            warn!(error = %e, "directory connection driver error");
                        }
                    });

                    ldap.simple_bind(&self.config.bind_dn, &self.config.bind_password)
                        .await
                        .map_err(|e| LdapError::Bind(e.to_string()))?
                        .success()
                        .map_err(|e| LdapError::Bind(format!("bind failed: {e:?}")))?;

                    return Ok(ldap);
                }
                Err(e) => {
                    warn!(hostname = %hostname, error = %e, "directory server unreachable, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(LdapError::connection(format!(
            "no directory server reachable: {}",
            last_error.map_or_else(|| "no hostnames configured".to_string(), |e| e.to_string())
        )))
    }

    async fn search(
        &self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> LdapResult<Vec<DirEntry>> {
        let filter = filter.to_string();
        let mut ldap = self.connect().await?;

        let (results, _outcome) = ldap
            .search(base, Scope::Subtree, &filter, attributes.to_vec())
            .await
            .map_err(|e| LdapError::Search(e.to_string()))?
            .success()
            .map_err(|e| LdapError::Search(format!("search failed: {e:?}")))?;

        let _ = ldap.unbind().await;

        debug!(base, filter = %filter, hits = results.len(), "directory search");

        Ok(results
            .into_iter()
            .map(SearchEntry::construct)
            .map(DirEntry::from_search_entry)
            .collect())
    }
}

#[async_trait]
impl DirectoryTransport for LdapConnector {
    async fn search_one(
        &self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> LdapResult<Option<DirEntry>> {
        let entries = self.search(base, filter, attributes).await?;
        Ok(entries.into_iter().next())
    }

    async fn search_many(
        &self,
        base: &str,
        filter: &Filter,
        attributes: &[&str],
    ) -> LdapResult<Vec<DirEntry>> {
        self.search(base, filter, attributes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_accessors() {
        let mut attributes = HashMap::new();
        attributes.insert("cn".to_string(), vec!["Jane Doe".to_string()]);
        attributes.insert(
            "memberOf".to_string(),
            vec!["team-a".to_string(), "team-b".to_string()],
        );

        let entry = DirEntry {
            dn: "idmUserId=42,ou=People,dc=idm,dc=example,dc=org".to_string(),
            attributes,
        };

        assert_eq!(entry.first("cn"), Some("Jane Doe"));
        assert_eq!(entry.first("missing"), None);
        assert_eq!(entry.values("memberOf"), ["team-a", "team-b"]);
        assert!(entry.values("missing").is_empty());
    }
}
