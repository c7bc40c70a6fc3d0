use fadewrite_core::{Archive, Database, KvStore, MemoryStore, PersistenceError};
use tracing::warn;

/// On-disk storage, or an in-process stand-in when the database is unusable.
pub enum Store {
    Disk(Database),
    Memory(MemoryStore),
}

impl Store {
    /// Open the default database, falling back to memory so writing still works.
    pub fn open() -> Self {
        match Database::open() {
            Ok(db) => Store::Disk(db),
            Err(e) => {
                warn!(error = %e, "database unavailable; history and drafts will not persist");
                Store::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Store::Disk(_))
    }
}

impl KvStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match self {
            Store::Disk(db) => db.get(key),
            Store::Memory(mem) => mem.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        match self {
            Store::Disk(db) => db.set(key, value),
            Store::Memory(mem) => mem.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match self {
            Store::Disk(db) => db.remove(key),
            Store::Memory(mem) => mem.remove(key),
        }
    }
}

impl Archive for Store {
    fn archive(&mut self, text: &str, word_count: usize) -> Result<(), PersistenceError> {
        match self {
            Store::Disk(db) => db.archive(text, word_count),
            Store::Memory(mem) => mem.archive(text, word_count),
        }
    }
}
