mod config;
pub mod database;
pub mod drafts;
mod memory;

pub use config::{Config, DecayConfig, HistoryConfig, UiConfig};
pub use database::{Database, HistoryEntry};
pub use drafts::{clear_draft, load_draft, save_draft, Draft, DRAFT_KEY};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::PersistenceError;

/// Minimal key-value store used for drafts and other small blobs.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Receives buffers that were long enough to keep when they got destroyed.
pub trait Archive {
    fn archive(&mut self, text: &str, word_count: usize) -> Result<(), PersistenceError>;
}

/// Returns `~/.config/fadewrite[-dev]/` based on FADEWRITE_ENV.
///
/// Set FADEWRITE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, PersistenceError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FADEWRITE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fadewrite-dev")
    } else {
        base_dir.join("fadewrite")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| PersistenceError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
