//! Smoke tests for the formprobe CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the formprobe binary
fn formprobe() -> Command {
    let mut cmd = Command::cargo_bin("formprobe").expect("formprobe binary should exist");
    cmd.env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    formprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    formprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_no_args_shows_help() {
    formprobe().assert().failure();
}

#[test]
fn test_run_help_mentions_chromium() {
    formprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--chromium-path"))
        .stdout(predicate::str::contains("CHROMIUM_PATH"))
        .stdout(predicate::str::contains("--include-skipped"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_text() {
    formprobe()
        .args(["list", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TC-001"))
        .stdout(predicate::str::contains("TC-014"))
        .stdout(predicate::str::contains("(skipped: page does not parse ',' as a decimal separator)"));
}

#[test]
fn test_list_json() {
    let output = formprobe()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let cases: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cases = cases.as_array().unwrap();
    assert_eq!(cases.len(), 18);
    assert_eq!(cases[0]["id"], "TC-001");
    assert_eq!(cases[0]["inputs"], serde_json::json!([3, 4, 5]));
}

#[test]
fn test_list_from_case_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cases.yaml");
    fs::write(
        &path,
        "- id: MY-1\n  name: custom\n  inputs: [2, 2, 3]\n  expected: равнобедренный\n",
    )
    .unwrap();

    formprobe()
        .args(["list", "--color", "never", "--cases"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("MY-1"))
        .stdout(predicate::str::contains("TC-001").not());
}

#[test]
fn test_list_bad_case_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cases.json");
    fs::write(&path, "{ not json").unwrap();

    formprobe()
        .args(["list", "--cases"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

// ============================================================================
// run (argument errors only; no browser is started)
// ============================================================================

#[test]
fn test_run_missing_case_file() {
    formprobe()
        .args(["run", "--cases", "/nonexistent/cases.yaml"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_run_filter_matching_nothing() {
    formprobe()
        .args(["run", "--filter", "no-such-case"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("matches no case"));
}
