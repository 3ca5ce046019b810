//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They
//! run against the dev config directory (BREATHER_ENV=dev) so they
//! never touch a real user configuration.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "breather-cli", "--"])
        .args(args)
        .env("BREATHER_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
    assert!(stdout.contains("Breather CLI"));
}

#[test]
fn test_sequence_show() {
    let (stdout, _, code) = run_cli(&["sequence", "show"]);
    assert_eq!(code, 0, "sequence show failed");
    assert!(stdout.contains("Breath In"));
    assert!(stdout.contains("total"));
}

#[test]
fn test_sequence_show_json() {
    let (stdout, _, code) = run_cli(&["sequence", "show", "--json"]);
    assert_eq!(code, 0, "sequence show --json failed");
    let phases: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(phases.as_array().map(|a| a.len()), Some(5));
}

#[test]
fn test_config_path() {
    let (stdout, _, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0, "config path failed");
    assert!(stdout.contains("breather-dev"));
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "ui.frame_rate"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0, "config get accepted an unknown key");
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_roundtrip() {
    let (_, _, code) = run_cli(&["config", "set", "cues.vibration", "false"]);
    assert_eq!(code, 0, "config set failed");
    let (stdout, _, code) = run_cli(&["config", "get", "cues.vibration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");
    // Restore the default for other tests.
    let (_, _, code) = run_cli(&["config", "set", "cues.vibration", "true"]);
    assert_eq!(code, 0);
}

#[test]
fn test_completions_bash() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("breather-cli"));
}
