use std::collections::HashMap;

use chrono::Utc;

use super::{Archive, HistoryEntry, KvStore};
use crate::error::PersistenceError;

/// In-process store for tests and simulations. Nothing touches disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    history: Vec<HistoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archived entries, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.values.remove(key);
        Ok(())
    }
}

impl Archive for MemoryStore {
    fn archive(&mut self, text: &str, word_count: usize) -> Result<(), PersistenceError> {
        self.history.push(HistoryEntry {
            id: self.history.len() as i64 + 1,
            text: text.to_string(),
            word_count,
            archived_at: Utc::now(),
        });
        Ok(())
    }
}
