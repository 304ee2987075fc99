//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Build command for the nettriage binary with a clean environment.
fn nettriage_cli() -> Command {
    let mut cmd = cargo_bin_cmd!("nettriage");
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("NETTRIAGE_AI_URL")
        .env_remove("NETTRIAGE_DB")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn diagnose_into(db: &Path, problem: &str) {
    nettriage_cli()
        .arg("--db")
        .arg(db)
        .args(["diagnose", problem])
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    let mut cmd = nettriage_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("network problem"));
}

#[test]
fn test_cli_version() {
    let mut cmd = nettriage_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_diagnose_human() {
    let mut cmd = nettriage_cli();

    cmd.args(["diagnose", "my", "wifi", "is", "slow"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Problem: my wifi is slow"))
        .stdout(predicate::str::contains("1. "))
        .stdout(predicate::str::contains("performance"));
}

#[test]
fn test_cli_diagnose_json() {
    let value = stdout_json(nettriage_cli().args(["diagnose", "my wifi is slow", "--format", "json"]));

    assert_eq!(value["detectedIssues"], serde_json::json!(["performance"]));
    // 70 base + 15 single tag + 5 common issue
    assert_eq!(value["confidence"], 90);
    assert_eq!(value["solutions"].as_array().unwrap().len(), 4);
    assert_eq!(value["followUpQuestions"].as_array().unwrap().len(), 2);
    assert!(value.get("reasoning").is_none());
}

#[test]
fn test_cli_diagnose_empty_problem() {
    let value = stdout_json(nettriage_cli().args(["diagnose", "", "--format", "json"]));

    assert_eq!(value["detectedIssues"], serde_json::json!(["general_connectivity"]));
    assert_eq!(value["solutions"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_diagnose_requires_problem() {
    let mut cmd = nettriage_cli();

    cmd.arg("diagnose");
    cmd.assert().failure();
}

#[test]
fn test_cli_keyword_strategy() {
    let value = stdout_json(nettriage_cli().args([
        "diagnose",
        "modem blinking orange",
        "--strategy",
        "keyword",
        "--format",
        "json",
    ]));

    assert_eq!(value["detectedIssues"], serde_json::json!(["router_issues"]));
}

#[test]
fn test_cli_verbose_json_includes_signals() {
    let value = stdout_json(nettriage_cli().args([
        "diagnose",
        "My xbox keeps lagging during gaming 12345",
        "--format",
        "json",
        "--verbose",
    ]));

    assert_eq!(value["signals"]["device"], "gaming_console");
    assert_eq!(value["signals"]["has_numbers"], true);
    assert_eq!(value["diagnosis"]["confidence"], 98);
    assert_eq!(value["severity"], "medium");
}

#[test]
fn test_cli_history_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("history.db");

    diagnose_into(&db, "tv keeps buffering");
    diagnose_into(&db, "xbox lag");

    let value = stdout_json(
        nettriage_cli()
            .arg("--db")
            .arg(&db)
            .args(["history", "--format", "json", "--limit", "1"]),
    );
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["problem"], "xbox lag");

    nettriage_cli()
        .env("NETTRIAGE_DB", &db)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("tv keeps buffering"));
}

#[test]
fn test_cli_no_history_flag() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("history.db");

    nettriage_cli()
        .arg("--db")
        .arg(&db)
        .args(["diagnose", "slow wifi", "--no-history"])
        .assert()
        .success();

    nettriage_cli()
        .arg("--db")
        .arg(&db)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No troubleshooting history yet"));
}

#[test]
fn test_cli_history_disabled_without_db() {
    let mut cmd = nettriage_cli();

    cmd.arg("history");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("History is disabled"));
}

#[test]
fn test_cli_rules() {
    let mut cmd = nettriage_cli();

    cmd.args(["rules", "--verbose"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("performance"))
        .stdout(predicate::str::contains("router_issues"))
        .stdout(predicate::str::contains("gaming_console"))
        .stdout(predicate::str::contains("critical"));
}

#[test]
fn test_cli_ai_without_key_fails() {
    let mut cmd = nettriage_cli();

    cmd.args(["diagnose", "slow wifi", "--ai"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_cli_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, r#"{"scoring": {"confidence_cap": 150}}"#).unwrap();

    nettriage_cli()
        .arg("--config")
        .arg(&config)
        .args(["diagnose", "slow wifi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence_cap"));
}
