//! SQLite-backed key-value store.
//!
//! Each snapshot kind lives in one row of the `kv` table as a JSON string,
//! replaced wholesale with `INSERT OR REPLACE` on every write.

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, Store, StoreKind};
use crate::error::{DatabaseError, Result};

pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open the database at `<data_dir>/brainsync.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("brainsync.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl Store for KvStore {
    fn get(&self, kind: StoreKind) -> Option<serde_json::Value> {
        let raw = match self.kv_get(kind.key()) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(key = kind.key(), error = %e, "failed to read snapshot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = kind.key(), error = %e, "stored snapshot is not valid JSON");
                None
            }
        }
    }

    fn set(&self, kind: StoreKind, value: serde_json::Value) {
        if let Err(e) = self.kv_set(kind.key(), &value.to_string()) {
            tracing::error!(key = kind.key(), error = %e, "failed to save snapshot");
        }
    }

    fn remove(&self, kind: StoreKind) {
        if let Err(e) = self.kv_delete(kind.key()) {
            tracing::error!(key = kind.key(), error = %e, "failed to delete snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kv_store() {
        let db = KvStore::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn snapshots_round_trip_through_sqlite() {
        let db = KvStore::open_memory().unwrap();
        db.set(StoreKind::AlertState, json!({ "last_alert_score": 25 }));
        assert_eq!(
            db.get(StoreKind::AlertState),
            Some(json!({ "last_alert_score": 25 }))
        );
        assert!(db.get(StoreKind::TimerData).is_none());
    }

    #[test]
    fn corrupt_json_reads_as_missing() {
        let db = KvStore::open_memory().unwrap();
        db.kv_set(StoreKind::Statistics.key(), "{not json").unwrap();
        assert!(db.get(StoreKind::Statistics).is_none());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brainsync.db");
        {
            let db = KvStore::open_at(&path).unwrap();
            db.set(StoreKind::TimerData, json!({ "set_index": 3 }));
        }
        let db = KvStore::open_at(&path).unwrap();
        assert_eq!(db.get(StoreKind::TimerData), Some(json!({ "set_index": 3 })));
    }
}
