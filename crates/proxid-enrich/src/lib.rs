//! # proxid-enrich
//!
//! Request-time attribute enrichment step for a SAML/OIDC proxy pipeline.
//!
//! After upstream steps have established the user's internal identifier,
//! this step fetches configured attributes from the identity-management
//! backend through a pluggable adapter and rewrites them into the attribute
//! names downstream consumers expect. It mutates the caller-supplied
//! attribute bag in place and never halts the pipeline: missing
//! preconditions pass the bag through untouched, and only fatal
//! configuration/programmer errors surface to the host.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod factory;
pub mod step;

pub use config::{EnrichConfig, Mode};
pub use error::{EnrichError, EnrichResult};
pub use factory::create_adapter;
pub use step::{AttributeBag, AttributeEnricher, USER_ID_ATTRIBUTE};
