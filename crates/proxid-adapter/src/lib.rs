//! # proxid-adapter
//!
//! Backend-adapter abstraction for the proxid identity-attribute enrichment
//! layer.
//!
//! This crate defines the capability set every backend adapter implements
//! ([`IdmAdapter`]), the selection enum used to pick a concrete adapter
//! ([`AdapterKind`]), and the declarative translation table that maps
//! canonical internal attribute names onto per-backend wire names with
//! declared value types ([`attrmap::AttributeMap`]).

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attrmap;
pub mod error;
pub mod provider;

pub use attrmap::{AttributeMap, AttributeType, WireTarget};
pub use error::{AdapterError, AdapterResult};
pub use provider::{AdapterKind, IdmAdapter};
