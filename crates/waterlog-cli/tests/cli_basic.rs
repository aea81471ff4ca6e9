//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own throwaway HOME so config and
//! database state never leak between tests or into the real user profile.

use std::path::Path;
use std::process::Command;

fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_waterlog-cli"))
        .env("HOME", home)
        .args(args)
        .output()
        .expect("failed to execute waterlog-cli");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn config_list_shows_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["goal"]["daily_ml"], 2000);
    assert_eq!(json["smart_reminders"]["interval_min"], 90);
}

#[test]
fn config_set_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "goal.daily_ml", "2500"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "goal.daily_ml"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2500");
}

#[test]
fn config_get_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "goal.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn drink_add_shows_in_status() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["drink", "add", "500"]);
    assert_eq!(code, 0);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(added["amount_ml"], 500);
    assert_eq!(added["kind"], "water");

    let (stdout, _, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["total_actual_ml"], 500);
    assert_eq!(status["goal_reached"], false);
}

#[test]
fn drink_add_rejects_zero_volume() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["drink", "add", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn drink_delete_missing_entry_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["drink", "delete", "42"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no such entry"));
}

#[test]
fn drink_kinds_lists_catalog() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["drink", "kinds"]);
    assert_eq!(code, 0);
    let kinds: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(kinds.as_array().unwrap().len() >= 8);
}

#[test]
fn reminders_schedule_then_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["reminders", "schedule"]);
    assert_eq!(code, 0);
    let scheduled: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    // All weekdays are active by default, so something is always pending.
    assert!(scheduled["pending"].as_u64().unwrap() >= 1);

    let (stdout, _, code) = run_cli(home.path(), &["reminders", "list"]);
    assert_eq!(code, 0);
    let pending: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(!pending.as_array().unwrap().is_empty());
}

#[test]
fn reminders_cancel_clears_pending() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["reminders", "schedule"]);
    let (_, _, code) = run_cli(home.path(), &["reminders", "cancel"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["reminders", "list"]);
    let pending: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(pending.as_array().unwrap().is_empty());
}

#[test]
fn custom_reminder_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["reminders", "custom", "add", "07:30", "morning glass", "--days", "mon,wed"],
    );
    assert_eq!(code, 0);
    let created: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["label"], "morning glass");

    let (stdout, _, code) = run_cli(home.path(), &["reminders", "custom", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&id));

    let (stdout, _, code) = run_cli(home.path(), &["reminders", "custom", "remove", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("removed"));

    let (_, stderr, code) = run_cli(home.path(), &["reminders", "custom", "remove", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no such reminder"));
}

#[test]
fn stats_commands_run() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["drink", "add", "250", "coffee"]);
    for action in ["today", "all"] {
        let (stdout, _, code) = run_cli(home.path(), &["stats", action]);
        assert_eq!(code, 0);
        let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(stats["today_entries"], 1);
        assert_eq!(stats["today_ml"], 250);
    }
}

#[test]
fn completions_generate() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("waterlog-cli"));
}
