//! # Key-Value Store Contract
//!
//! The engine consumes a string-keyed store through [`KvStore`] and never
//! looks behind it. Two implementations ship with the crate:
//! - [`MemoryStore`]: volatile `BTreeMap` (this module)
//! - [`crate::storage::RedbStore`]: disk-backed redb table
//!
//! Every logical graph mutation is collected into a [`WriteBatch`] and handed
//! to [`KvStore::apply`], so a backend with transactions can commit the
//! structural change and its counter updates as one unit.

use crate::GraphError;
use std::collections::BTreeMap;

// =============================================================================
// WRITE BATCH
// =============================================================================

/// A single buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite `key` with `value`.
    Set { key: String, value: String },
    /// Remove `key` if present.
    Delete { key: String },
}

/// Ordered list of writes applied as one unit.
///
/// Later operations on the same key win, exactly as if applied one by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert/overwrite.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Queue a removal.
    pub fn delete(&mut self, key: impl Into<String>) {
        self.ops.push(WriteOp::Delete { key: key.into() });
    }

    /// Number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate queued operations in order.
    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.ops.iter()
    }

    /// Consume the batch into its operations.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// =============================================================================
// KVSTORE TRAIT
// =============================================================================

/// The key-value contract the graph is built on.
///
/// All fallible operations return `Result<T, GraphError>` so in-memory and
/// persistent backends can be used uniformly. `keys()` is an unordered
/// enumeration; callers that need an order must sort.
pub trait KvStore {
    /// Insert or overwrite a value. Returns `true` on success.
    fn set(&mut self, key: &str, value: &str) -> Result<bool, GraphError>;

    /// Look up a value.
    fn get(&self, key: &str) -> Result<Option<String>, GraphError>;

    /// Remove a key. Returns `true` if it was present.
    fn delete(&mut self, key: &str) -> Result<bool, GraphError>;

    /// Check if a key is present.
    fn exists(&self, key: &str) -> Result<bool, GraphError>;

    /// Enumerate all keys.
    fn keys(&self) -> Result<Vec<String>, GraphError>;

    /// Number of entries.
    fn count(&self) -> Result<usize, GraphError>;

    /// Remove every entry.
    fn clear(&mut self) -> Result<(), GraphError>;

    /// Apply a batch of writes.
    ///
    /// The default applies the operations one by one. Backends with
    /// transactions override this to commit the batch atomically.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), GraphError> {
        for op in batch.into_ops() {
            match op {
                WriteOp::Set { key, value } => {
                    self.set(&key, &value)?;
                }
                WriteOp::Delete { key } => {
                    self.delete(&key)?;
                }
            }
        }
        Ok(())
    }

    /// Enumerate keys starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, GraphError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile in-memory store.
///
/// Uses `BTreeMap` so key enumeration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl KvStore for MemoryStore {
    fn set(&mut self, key: &str, value: &str) -> Result<bool, GraphError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<String>, GraphError> {
        Ok(self.entries.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<bool, GraphError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> Result<bool, GraphError> {
        Ok(self.entries.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, GraphError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn count(&self) -> Result<usize, GraphError> {
        Ok(self.entries.len())
    }

    fn clear(&mut self) -> Result<(), GraphError> {
        self.entries.clear();
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, GraphError> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
