//! ACID-durable key-value tables backed by redb.
//!
//! One database file holds every durable table of a data directory: the
//! sync baselines and the subject registry. redb allows a single open
//! handle per file, so the store is shared behind an `Arc`.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::{StoreError, StoreResult};

/// Tables are keyed by subject identifier.
pub type Table = TableDefinition<'static, &'static str, &'static [u8]>;

pub const DB_FILE: &str = "orcid-vivo.redb";

#[derive(Clone)]
pub struct DurableStore {
    db: Arc<Database>,
}

fn redb_err(op: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Redb {
        message: format!("{op} failed: {e}"),
    }
}

impl DurableStore {
    /// Open or create the database in the given directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join(DB_FILE);
        let db = Database::create(&db_path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn put(&self, table: Table, key: &str, value: &[u8]) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        {
            let mut t = txn
                .open_table(table)
                .map_err(|e| redb_err("open_table", e))?;
            t.insert(key, value)
                .map_err(|e| redb_err("insert", e))?;
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(())
    }

    /// Read a value. A table that was never written reads as empty.
    pub fn get(&self, table: Table, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(|e| redb_err("begin_read", e))?;
        let t = match txn.open_table(table) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb_err("open_table", e)),
        };
        let value = t.get(key).map_err(|e| redb_err("get", e))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    /// Delete a key. Returns whether it existed.
    pub fn remove(&self, table: Table, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        let existed = {
            let mut t = txn
                .open_table(table)
                .map_err(|e| redb_err("open_table", e))?;
            let removed = t.remove(key).map_err(|e| redb_err("remove", e))?;
            removed.is_some()
        };
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(existed)
    }

    /// Every entry of a table, in key order.
    pub fn entries(&self, table: Table) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let txn = self.db.begin_read().map_err(|e| redb_err("begin_read", e))?;
        let t = match txn.open_table(table) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(redb_err("open_table", e)),
        };
        let mut entries = Vec::new();
        for row in t.iter().map_err(|e| redb_err("iter", e))? {
            let (k, v) = row.map_err(|e| redb_err("iter", e))?;
            entries.push((k.value().to_string(), v.value().to_vec()));
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish()
    }
}
