//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points HOME at its own temporary directory so config, drafts and history
//! never touch the real ones.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command with `home` as the home directory and return output.
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "fadewrite-cli", "--"])
        .args(args)
        .env("HOME", home.path())
        .env_remove("FADEWRITE_ENV")
        .env_remove("FADEWRITE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn home() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp home")
}

#[test]
fn test_config_get_default_timeout() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "decay.timeout_seconds"]);
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_set_and_get() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["config", "set", "decay.timeout_seconds", "12"]);
    assert_eq!(code, 0, "Config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (_, stdout, _) = run_cli(&home, &["config", "get", "decay.timeout_seconds"]);
    assert_eq!(stdout.trim(), "12");
}

#[test]
fn test_config_set_out_of_range_fails() {
    let home = home();
    let (code, _, stderr) = run_cli(&home, &["config", "set", "decay.timeout_seconds", "31"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("out of range"), "stderr: {stderr}");

    let (_, stdout, _) = run_cli(&home, &["config", "get", "decay.timeout_seconds"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let home = home();
    let (code, _, stderr) = run_cli(&home, &["config", "get", "decay.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_list() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    assert!(stdout.contains("decay.timeout_seconds = 5"));

    let (code, stdout, _) = run_cli(&home, &["config", "list", "--json"]);
    assert_eq!(code, 0, "Config list --json failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["decay"]["easing"], "quadratic");
    assert_eq!(parsed["history"]["min_words"], 3);
}

#[test]
fn test_history_list_empty() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["history", "list", "--json"]);
    assert_eq!(code, 0, "History list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(0));
}

#[test]
fn test_draft_show_without_draft() {
    let home = home();
    let (code, _, stderr) = run_cli(&home, &["draft", "show"]);
    assert_eq!(code, 0, "Draft show failed");
    assert!(stderr.contains("no draft"));
}

#[test]
fn test_simulate_pause_destroys_once() {
    let home = home();
    let (code, stdout, _) = run_cli(
        &home,
        &[
            "simulate",
            "--timeout",
            "2",
            "--gaps",
            "0.5,0.5,4",
            "--text",
            "alpha beta",
            "--no-ticks",
        ],
    );
    assert_eq!(code, 0, "Simulate failed");

    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let destroyed: Vec<_> = events
        .iter()
        .filter(|e| e["event"]["type"] == "text_destroyed")
        .collect();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0]["at_ms"], 4_000);
    assert_eq!(destroyed[0]["event"]["final_text"], "alpha beta");
    assert!(events.iter().all(|e| e["event"]["type"] != "decay_tick"));
}

#[test]
fn test_simulate_steady_typing_never_destroys() {
    let home = home();
    let gaps = vec!["0.5"; 40].join(",");
    let (code, stdout, _) = run_cli(&home, &["simulate", "--gaps", &gaps]);
    assert_eq!(code, 0, "Simulate failed");
    assert!(!stdout.contains("text_destroyed"));
    assert!(!stdout.contains("decay_tick"));
}

#[test]
fn test_simulate_huge_trailing_gap_destroys_once() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["simulate", "--gaps", "0.5,2e16", "--no-ticks"]);
    assert_eq!(code, 0, "Simulate failed");
    assert_eq!(stdout.matches("text_destroyed").count(), 1);
}

#[test]
fn test_simulate_rejects_bad_timeout() {
    let home = home();
    let (code, _, stderr) = run_cli(&home, &["simulate", "--timeout", "0", "--gaps", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_completions_bash() {
    let home = home();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0, "Completions failed");
    assert!(stdout.contains("fadewrite"));
}
