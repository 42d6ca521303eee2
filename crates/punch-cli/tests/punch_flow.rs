//! End-to-end integration tests for the complete punch flow.
//!
//! Drives the built binary through entry → pause → resume → exit and the
//! reporting commands, against a database isolated in a temp directory.

use std::process::{Command, Output};

use tempfile::TempDir;

fn punch_binary() -> String {
    env!("CARGO_BIN_EXE_punch").to_string()
}

/// Run the binary with its database and worker pinned to the temp dir.
fn punch(temp: &TempDir, args: &[&str]) -> Output {
    Command::new(punch_binary())
        .env("HOME", temp.path())
        .env(
            "PUNCH_DATABASE_PATH",
            temp.path().join("punch.db").display().to_string(),
        )
        .env("PUNCH_WORKER", "maria")
        .args(args)
        .output()
        .expect("failed to run punch")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "punch should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_full_day_flow() {
    let temp = TempDir::new().unwrap();

    let output = stdout(&punch(&temp, &["in"]));
    assert!(output.contains("Registered entry for maria"));
    assert!(output.contains("Status: working"));

    let output = stdout(&punch(&temp, &["pause"]));
    assert!(output.contains("Status: on_pause"));

    let output = stdout(&punch(&temp, &["resume"]));
    assert!(output.contains("Status: working"));

    let output = stdout(&punch(&temp, &["out"]));
    assert!(output.contains("Status: finished"));

    let output = stdout(&punch(&temp, &["status"]));
    assert!(output.contains("finished"));
    assert!(!output.contains("Predicted exit"));
}

#[test]
fn test_status_on_empty_day() {
    let temp = TempDir::new().unwrap();

    let output = stdout(&punch(&temp, &["status"]));
    assert!(output.contains("awaiting"));
    assert!(output.contains("Entry:  -"));
    assert!(output.contains("Worked: 00:00:00"));
}

#[test]
fn test_status_json_is_parseable() {
    let temp = TempDir::new().unwrap();
    stdout(&punch(&temp, &["in"]));

    let output = stdout(&punch(&temp, &["status", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["worker"], "maria");
    assert_eq!(value["status"], "working");
}

#[test]
fn test_week_report_includes_registered_day() {
    let temp = TempDir::new().unwrap();
    stdout(&punch(&temp, &["in"]));
    stdout(&punch(&temp, &["out"]));

    let output = stdout(&punch(&temp, &["report", "--week"]));
    assert!(output.contains("PUNCH REPORT: maria"));
    assert!(output.contains("Complete days: 1"));
}

#[test]
fn test_report_json_summary() {
    let temp = TempDir::new().unwrap();
    stdout(&punch(&temp, &["in"]));
    stdout(&punch(&temp, &["out"]));

    let output = stdout(&punch(&temp, &["report", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["summary"]["complete_days"], 1);
    assert_eq!(value["rows"].as_array().unwrap().len(), 1);
}

#[test]
fn test_csv_export_has_header() {
    let temp = TempDir::new().unwrap();
    stdout(&punch(&temp, &["in"]));
    stdout(&punch(&temp, &["out"]));

    let output = stdout(&punch(&temp, &["export", "--format", "csv"]));
    let mut lines = output.lines();
    assert_eq!(
        lines.next(),
        Some("worker,date,entry,exit,pause_seconds,worked_seconds")
    );
    // One data row for today plus the trailing total row.
    let rest: Vec<&str> = lines.collect();
    assert_eq!(rest.len(), 2);
    assert!(rest[0].starts_with("maria,"));
    assert!(rest[1].starts_with("maria,total,"));
}

#[test]
fn test_schedule_set_and_show() {
    let temp = TempDir::new().unwrap();

    let output = stdout(&punch(
        &temp,
        &[
            "schedule",
            "set",
            "--entry",
            "09:00",
            "--exit",
            "18:00",
            "--pause-start",
            "12:00",
            "--pause-end",
            "13:00",
        ],
    ));
    assert!(output.contains("Schedule updated."));

    let output = stdout(&punch(&temp, &["schedule", "show"]));
    assert!(output.contains("Entry: 09:00"));
    assert!(output.contains("Pause: 12:00-13:00 (fixed window)"));
    assert!(output.contains("Net day: 08:00:00"));
}

#[test]
fn test_worker_flag_overrides_configured_worker() {
    let temp = TempDir::new().unwrap();
    stdout(&punch(&temp, &["in"]));

    // A different worker sees an empty day in the same database.
    let output = stdout(&punch(&temp, &["--worker", "joao", "status"]));
    assert!(output.contains("Status for joao"));
    assert!(output.contains("awaiting"));
}

#[test]
fn test_inconsistent_schedule_is_rejected() {
    let temp = TempDir::new().unwrap();

    let output = punch(
        &temp,
        &[
            "schedule",
            "set",
            "--entry",
            "08:00",
            "--exit",
            "10:00",
            "--pause-minutes",
            "180",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inconsistent"));
}
