//! # proxid-adapter-ldap
//!
//! Directory-backed adapter for the proxid identity-attribute enrichment
//! layer, built on `ldap3`.
//!
//! This is the full-capability backend: user, facility, group, and
//! capability resolution all run as directory searches against the
//! identity-management system's LDAP interface. Directory unavailability is
//! softened to "no attributes found" wherever an absent or empty result is a
//! valid outcome, so an outage degrades enrichment instead of failing the
//! authentication pipeline.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod adapter;
pub mod config;
pub mod connector;
pub mod error;
pub mod filter;

pub use adapter::LdapAdapter;
pub use config::{LdapConfig, LdapSettings};
pub use connector::{DirEntry, DirectoryTransport, LdapConnector};
pub use error::{LdapError, LdapResult};
pub use filter::Filter;
