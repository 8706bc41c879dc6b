//! Snapshot store for TabSync.
//!
//! Persists the registry's serialized shape — the ordered tab sequence with
//! its active flags — as a single keyed slot in SQLite. The slot is read
//! exactly once at bootstrap and written through after every mutation when
//! the engine runs against an emulated host. Writes are all-or-nothing
//! single-statement upserts, so a failed write never corrupts a snapshot.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;

use crate::database::connection::Database;
use crate::types::errors::StoreError;
use crate::types::tab::Tab;

/// Fixed namespace key the registry snapshot lives under.
pub const SNAPSHOT_KEY: &str = "tabsync.tabs";

/// SQLite-backed keyed snapshot slot.
pub struct SnapshotStore {
    db: Arc<Database>,
    key: String,
}

impl SnapshotStore {
    /// Creates a store over the fixed [`SNAPSHOT_KEY`] namespace.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Serializes and writes the tab sequence. Last writer wins.
    pub fn save(&self, tabs: &[Tab]) -> Result<(), StoreError> {
        let json = serde_json::to_string(tabs)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        self.db
            .connection()
            .execute(
                "INSERT INTO snapshots (key, data, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                params![self.key, json, now],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reads the stored tab sequence, or `None` if the slot is absent.
    pub fn load(&self) -> Result<Option<Vec<Tab>>, StoreError> {
        let result = self.db.connection().query_row(
            "SELECT data FROM snapshots WHERE key = ?1",
            params![self.key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(json) => {
                let tabs: Vec<Tab> = serde_json::from_str(&json)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(tabs))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    /// Removes the snapshot slot.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM snapshots WHERE key = ?1", params![self.key])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}
