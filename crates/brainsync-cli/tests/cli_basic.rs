//! Basic CLI E2E tests.
//!
//! Each test runs the compiled binary against its own data directory via
//! `BRAINSYNC_HOME`, so runs never touch the user's real data.

use std::path::Path;

use assert_cmd::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::cargo_bin("brainsync")
        .expect("binary built")
        .env("BRAINSYNC_HOME", home)
        .env_remove("BRAINSYNC_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("JSON output")
}

#[test]
fn test_timer_status_starts_idle() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["timer", "status"]);
    assert_eq!(status["state"], "idle");
    assert_eq!(status["set_index"], 1);
    assert_eq!(status["remaining"], "0:00");
}

#[test]
fn test_timer_start_pause_reset() {
    let home = tempfile::tempdir().unwrap();

    let started = run_json(home.path(), &["timer", "start"]);
    assert_eq!(started["state"], "working");
    assert_eq!(started["remaining"], "30:00");
    assert!(started["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["type"] == "StateChanged" && e["state"] == "working"));

    let paused = run_json(home.path(), &["timer", "pause"]);
    assert_eq!(paused["state"], "paused");

    let reset = run_json(home.path(), &["timer", "reset"]);
    assert_eq!(reset["state"], "idle");

    let today = run_json(home.path(), &["stats", "today"]);
    assert_eq!(today["interrupted_sessions"], 1);
    assert_eq!(today["sessions"], 0);
    assert_eq!(today["fatigue_level"], "good");
}

#[test]
fn test_break_and_skip() {
    let home = tempfile::tempdir().unwrap();
    let brk = run_json(home.path(), &["timer", "break", "--long"]);
    assert_eq!(brk["state"], "breaking");
    assert_eq!(brk["remaining"], "15:00");

    let skipped = run_json(home.path(), &["timer", "skip-break"]);
    assert_eq!(skipped["state"], "working");
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "timer.work_duration", "50"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.work_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");

    let started = run_json(home.path(), &["timer", "start"]);
    assert_eq!(started["remaining"], "50:00");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("timer.nope"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.work_duration", "abc"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_list_and_reset() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "fatigue_alert.threshold", "30"]);
    run_cli(home.path(), &["config", "reset"]);

    let config = run_json(home.path(), &["config", "list"]);
    assert_eq!(config["fatigue_alert"]["threshold"], 21);
    assert_eq!(config["timer"]["long_break_interval"], 4);
}

#[test]
fn test_stats_export_header() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["stats", "export", "--range", "all"]);
    assert_eq!(code, 0);
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Sessions,Focus Time (min),Break Time (min),Interrupted,Fatigue Score")
    );
    assert_eq!(lines.count(), 1);
}

#[test]
fn test_stats_export_to_file() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("week.csv");
    let (_, _, code) = run_cli(
        home.path(),
        &["stats", "export", "--range", "week", "--output", out.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(csv.lines().count(), 8);
}

#[test]
fn test_stats_export_rejects_unknown_range() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["stats", "export", "--range", "year"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_week_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let week = run_json(home.path(), &["stats", "week"]);
    assert_eq!(week["daily_stats"].as_array().unwrap().len(), 7);
    assert_eq!(week["total_sessions"], 0);

    let (stdout, _, code) = run_cli(home.path(), &["stats", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "statistics reset");

    let all = run_json(home.path(), &["stats", "all"]);
    assert_eq!(all["total_sessions"], 0);
}

#[test]
fn test_watch_when_idle_prints_status() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["timer", "watch"]);
    assert_eq!(status["state"], "idle");
}
