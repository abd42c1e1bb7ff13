//! # proxid-adapter-rpc
//!
//! RPC-backed adapter for the proxid identity-attribute enrichment layer,
//! speaking the backend's JSON-over-HTTP management API.
//!
//! This is the minimal interface every deployment exposes, and therefore the
//! default adapter: it resolves users and user attributes. Facility, group,
//! and capability resolution need the directory interface and answer with
//! explicit neutral values here, keeping the capability-set contract total.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod adapter;
pub mod config;
pub mod connector;
pub mod error;

pub use adapter::{RpcAdapter, RpcAttribute};
pub use config::{RpcConfig, RpcSettings};
pub use connector::{RpcConnector, RpcTransport};
pub use error::{RpcError, RpcResult};
