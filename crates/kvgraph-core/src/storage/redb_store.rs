//! # redb-backed Key-Value Store
//!
//! A disk-backed [`KvStore`] using the redb embedded database.
//!
//! One table maps string keys to string values. redb provides:
//! - ACID transactions (one per [`KvStore::apply`] batch)
//! - Crash safety (copy-on-write B-trees)
//! - Persistence across process restarts
//!
//! The graph layer above it is unchanged; reopening a database file and
//! calling `Graph::open` resumes the stored graph, counters included.

use crate::kv::{KvStore, WriteBatch, WriteOp};
use crate::GraphError;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// The single table holding every record: key -> value.
const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

fn storage_err(e: impl std::fmt::Display) -> GraphError {
    GraphError::Storage(e.to_string())
}

/// A disk-backed key-value store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Create the table up front so read transactions never miss it.
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), GraphError> {
        self.db.compact().map_err(storage_err)?;
        Ok(())
    }
}

// =============================================================================
// KVSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl KvStore for RedbStore {
    fn set(&mut self, key: &str, value: &str) -> Result<bool, GraphError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<String>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;
        let value = table
            .get(key)
            .map_err(storage_err)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn delete(&mut self, key: &str) -> Result<bool, GraphError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let removed = {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            table.remove(key).map_err(storage_err)?.is_some()
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(removed)
    }

    fn exists(&self, key: &str) -> Result<bool, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;
        Ok(table.get(key).map_err(storage_err)?.is_some())
    }

    fn keys(&self) -> Result<Vec<String>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (key, _) = entry.map_err(storage_err)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn count(&self) -> Result<usize, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;
        let count = table.len().map_err(storage_err)?;
        Ok(count as usize)
    }

    fn clear(&mut self) -> Result<(), GraphError> {
        let keys = self.keys()?;
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            for key in &keys {
                table.remove(key.as_str()).map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    /// Commit the whole batch in one write transaction.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), GraphError> {
        if batch.is_empty() {
            return Ok(());
        }

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            for op in batch.iter() {
                match op {
                    WriteOp::Set { key, value } => {
                        table
                            .insert(key.as_str(), value.as_str())
                            .map_err(storage_err)?;
                    }
                    WriteOp::Delete { key } => {
                        table.remove(key.as_str()).map_err(storage_err)?;
                    }
                }
            }
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;

        let mut keys = Vec::new();
        for entry in table.range(prefix..).map_err(storage_err)? {
            let (key, _) = entry.map_err(storage_err)?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        assert!(store.set("node:A", "{}").expect("set"));
        assert!(store.exists("node:A").expect("exists"));
        assert_eq!(store.get("node:A").expect("get").as_deref(), Some("{}"));
        assert_eq!(store.count().expect("count"), 1);

        assert!(store.delete("node:A").expect("delete"));
        assert!(!store.delete("node:A").expect("delete"));
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn persistence_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store.set("k", "v").expect("set");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
    }

    #[test]
    fn batch_commits_all_operations() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.set("old", "x").expect("set");

        let mut batch = WriteBatch::new();
        batch.set("a", "1");
        batch.set("b", "2");
        batch.set("a", "3");
        batch.delete("old");
        store.apply(batch).expect("apply");

        assert_eq!(store.get("a").expect("get").as_deref(), Some("3"));
        assert_eq!(store.get("b").expect("get").as_deref(), Some("2"));
        assert!(!store.exists("old").expect("exists"));
    }

    #[test]
    fn prefix_scan_stops_at_prefix_boundary() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        for key in ["adj:A", "edge:A:B", "edge:B:A", "node:A"] {
            store.set(key, "{}").expect("set");
        }

        let keys = store.keys_with_prefix("edge:").expect("scan");
        assert_eq!(keys, vec!["edge:A:B".to_string(), "edge:B:A".to_string()]);
    }

    #[test]
    fn clear_removes_everything() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.set("a", "1").expect("set");
        store.set("b", "2").expect("set");

        store.clear().expect("clear");
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn compact_and_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store.set("k", "v").expect("set");
            store.compact().expect("compact");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        assert_eq!(store.count().expect("count"), 1);
    }
}
