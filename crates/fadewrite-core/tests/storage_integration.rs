//! Integration tests for on-disk history, drafts and configuration.

use std::time::Duration;

use fadewrite_core::storage::{clear_draft, load_draft, save_draft};
use fadewrite_core::{
    Config, Database, DecayEngine, Easing, Event, ManualTimers, TimeoutSeconds, WritingSession,
};
use tempfile::tempdir;

#[test]
fn test_destroyed_text_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fadewrite.db");

    {
        let db = Database::open_at(&path).unwrap();
        let engine = DecayEngine::new(
            ManualTimers::new(),
            TimeoutSeconds::new(1).unwrap(),
            Easing::Linear,
        );
        let mut session = WritingSession::new(engine, db);
        session.start("").unwrap();
        session.handle_activity("words that will not last");
        let events = session.advance(Duration::from_secs(3));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TextDestroyed { archived: true, .. })));
    }

    let db = Database::open_at(&path).unwrap();
    let history = db.history(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "words that will not last");
    assert_eq!(history[0].word_count, 5);
    assert_eq!(db.history_count().unwrap(), 1);
}

#[test]
fn test_draft_survives_reopen_and_clears() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fadewrite.db");

    {
        let mut db = Database::open_at(&path).unwrap();
        save_draft(&mut db, "an unfinished thought").unwrap();
    }

    let mut db = Database::open_at(&path).unwrap();
    let draft = load_draft(&db).unwrap().unwrap();
    assert_eq!(draft.text, "an unfinished thought");
    assert_eq!(draft.word_count, 3);

    clear_draft(&mut db).unwrap();
    assert!(load_draft(&db).unwrap().is_none());
}

#[test]
fn test_draft_blob_uses_stable_field_names() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_at(&dir.path().join("fadewrite.db")).unwrap();
    save_draft(&mut db, "two words").unwrap();

    let raw = db.kv_get("draft").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["text"], "two words");
    assert_eq!(value["wordCount"], 2);
    assert!(value["savedAt"].is_string());
}

#[test]
fn test_config_file_is_created_and_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let cfg = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert_eq!(cfg.timeout(), TimeoutSeconds::DEFAULT);

    std::fs::write(&path, "[decay]\ntimeout_seconds = 90\neasing = \"cubic\"\n").unwrap();
    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.timeout().get(), 30);
    assert_eq!(cfg.easing(), Easing::Cubic);
}

#[test]
fn test_config_set_rejects_bad_timeout_and_keeps_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut cfg = Config::load_from(&path).unwrap();

    assert!(cfg.apply("decay.timeout_seconds", "0").is_err());
    assert!(cfg.apply("decay.timeout_seconds", "abc").is_err());
    assert_eq!(cfg.timeout(), TimeoutSeconds::DEFAULT);

    cfg.apply("decay.timeout_seconds", "12").unwrap();
    cfg.save_to(&path).unwrap();
    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.timeout().get(), 12);
    assert_eq!(reloaded.get("decay.timeout_seconds").as_deref(), Some("12"));
}
