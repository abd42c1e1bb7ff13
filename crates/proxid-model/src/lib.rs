//! # proxid-model
//!
//! Domain models for the proxid identity-attribute enrichment layer
//! (User, Facility, Group).
//!
//! All entity identifiers are opaque strings: the backing identity-management
//! system owns them, and the directory interface delivers them as text.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod facility;
pub mod group;
pub mod user;

pub use facility::Facility;
pub use group::Group;
pub use user::User;
