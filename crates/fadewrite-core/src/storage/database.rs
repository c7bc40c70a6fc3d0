//! SQLite-based history and key-value storage.
//!
//! Provides persistent storage for:
//! - Archived buffers that were destroyed with enough words in them
//! - Key-value store for drafts and other application state

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, Archive, KvStore};
use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub text: String,
    pub word_count: usize,
    pub archived_at: DateTime<Utc>,
}

/// SQLite database for history and key-value state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/fadewrite/fadewrite.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, PersistenceError> {
        Self::open_at(&data_dir()?.join("fadewrite.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                text        TEXT NOT NULL,
                word_count  INTEGER NOT NULL,
                archived_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_archived_at ON history(archived_at);",
        )?;
        Ok(())
    }

    /// Append an archived buffer to history.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_entry(
        &self,
        text: &str,
        word_count: usize,
        archived_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO history (text, word_count, archived_at) VALUES (?1, ?2, ?3)",
            params![text, word_count as i64, archived_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent entries first.
    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, word_count, archived_at
             FROM history
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, text, word_count, archived_at) = row?;
            let archived_at = DateTime::parse_from_rfc3339(&archived_at)
                .map_err(|e| PersistenceError::Corrupt {
                    key: format!("history:{id}"),
                    message: e.to_string(),
                })?
                .with_timezone(&Utc);
            entries.push(HistoryEntry {
                id,
                text,
                word_count: usize::try_from(word_count).unwrap_or(0),
                archived_at,
            });
        }
        Ok(entries)
    }

    pub fn history_count(&self) -> Result<u64, rusqlite::Error> {
        self.conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get::<_, u64>(0))
    }

    /// Delete all history. Returns the number of removed entries.
    pub fn clear_history(&self) -> Result<usize, rusqlite::Error> {
        self.conn.execute("DELETE FROM history", [])
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

    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        Ok(self.kv_remove(key)?)
    }
}

impl Archive for Database {
    fn archive(&mut self, text: &str, word_count: usize) -> Result<(), PersistenceError> {
        self.record_entry(text, word_count, Utc::now())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_list() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_entry("first entry here", 3, now).unwrap();
        db.record_entry("second entry is longer", 4, now).unwrap();

        let entries = db.history(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "second entry is longer");
        assert_eq!(entries[0].word_count, 4);
        assert_eq!(db.history_count().unwrap(), 2);

        assert_eq!(db.history(1).unwrap().len(), 1);
    }

    #[test]
    fn clear_history_removes_all() {
        let mut db = Database::open_memory().unwrap();
        db.archive("one two three", 3).unwrap();
        assert_eq!(db.clear_history().unwrap(), 1);
        assert!(db.history(10).unwrap().is_empty());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_remove("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fadewrite.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            KvStore::set(&mut db, "k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(KvStore::get(&db, "k").unwrap().as_deref(), Some("v"));
    }
}
