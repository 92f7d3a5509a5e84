//! # Persistent Storage
//!
//! Disk-backed implementations of the key-value contract.

mod redb_store;

pub use redb_store::RedbStore;
