//! Draft save/load.
//!
//! A draft is a single JSON blob `{text, wordCount, savedAt}` under
//! [`DRAFT_KEY`]. Field names are fixed so other tools can read it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KvStore;
use crate::error::PersistenceError;
use crate::session::word_count;

pub const DRAFT_KEY: &str = "draft";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub text: String,
    pub word_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            word_count: word_count(text),
            saved_at: Utc::now(),
        }
    }
}

/// Save `text` as the current draft, replacing any previous one.
pub fn save_draft<S: KvStore + ?Sized>(store: &mut S, text: &str) -> Result<Draft, PersistenceError> {
    let draft = Draft::new(text);
    let json = serde_json::to_string(&draft)?;
    store.set(DRAFT_KEY, &json).map_err(|e| {
        warn!(error = %e, "draft save failed");
        e
    })?;
    Ok(draft)
}

/// Load the current draft, if any.
pub fn load_draft<S: KvStore + ?Sized>(store: &S) -> Result<Option<Draft>, PersistenceError> {
    let Some(json) = store.get(DRAFT_KEY)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| PersistenceError::Corrupt {
            key: DRAFT_KEY.to_string(),
            message: e.to_string(),
        })
}

pub fn clear_draft<S: KvStore + ?Sized>(store: &mut S) -> Result<(), PersistenceError> {
    store.remove(DRAFT_KEY)
}
