//! # objlock-core
//!
//! Lease-based exclusive lock manager for serializing concurrent edits to
//! shared objects across sessions and users. Provides the lock lifecycle
//! (create/extend/release/query), lazy lease expiration, ownership and
//! override rules, and all-or-nothing-per-item bulk operations that still
//! report partial success.

pub mod bulk;
pub mod error;
pub mod expiry;
pub mod infrastructure;
#[path = "infrastructure_in_memory.rs"]
pub mod infrastructure_in_memory;
#[cfg(feature = "sqlite")]
#[path = "infrastructure_sqlite.rs"]
pub mod infrastructure_sqlite;
pub mod service;
pub mod types;

#[cfg(test)]
mod bulk_test;
#[cfg(test)]
#[path = "infrastructure_test.rs"]
mod infrastructure_test;
