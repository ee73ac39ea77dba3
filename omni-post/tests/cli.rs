//! Integration tests for the omni-post CLI.
//!
//! These run the binary against local fixtures only; nothing here talks to a
//! real platform.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("omni-post").unwrap();
    // Keep the default config out of the picture
    cmd.env("OMNIPOST_CONFIG", "/nonexistent/omnipost-config.toml");
    cmd
}

fn write_tokens(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("tokens.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_help_lists_token_file_format() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOKEN FILE"))
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_missing_token_file_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            dir.path().join("missing.json").to_str().unwrap(),
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read token file"));
}

#[test]
fn test_malformed_token_file_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{not json");
    cmd()
        .args(["Launch", "We shipped", "--tokens", tokens.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid token file"));
}

#[test]
fn test_unknown_platform_reports_per_result_failure() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            tokens.to_str().unwrap(),
            "--platforms",
            "myspace",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("myspace"))
        .stdout(predicate::str::contains("Platform not supported"));
}

#[test]
fn test_unconnected_platform_fails_without_network() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            tokens.to_str().unwrap(),
            "--platforms",
            "twitter",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("twitter is not connected"));
}

#[test]
fn test_json_output_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    let output = cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            tokens.to_str().unwrap(),
            "--platforms",
            "twitter,myspace",
            "--format",
            "json",
        ])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let results: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["platform"], "twitter");
    assert_eq!(results[0]["success"], false);
    assert_eq!(results[1]["error"], "Platform not supported");
}

#[test]
fn test_invalid_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            tokens.to_str().unwrap(),
            "--format",
            "yaml",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_no_platforms_selected_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    let config = dir.path().join("config.toml");
    fs::write(&config, "[defaults]\nplatforms = []\n").unwrap();
    cmd()
        .env("OMNIPOST_CONFIG", &config)
        .args(["Launch", "We shipped", "--tokens", tokens.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No platforms selected"));
}

#[test]
fn test_default_platforms_come_from_config() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    cmd()
        .args(["Launch", "We shipped", "--tokens", tokens.to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("twitter is not connected"));
}

#[test]
fn test_unsupported_media_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, r#"{"twitter": "tok"}"#);
    let media = dir.path().join("notes.txt");
    fs::write(&media, "plain text").unwrap();
    cmd()
        .args([
            "Launch",
            "We shipped",
            "--tokens",
            tokens.to_str().unwrap(),
            "--platforms",
            "twitter",
            "--media",
            media.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported media type"));
}

#[test]
fn test_body_read_from_stdin() {
    let dir = TempDir::new().unwrap();
    let tokens = write_tokens(&dir, "{}");
    cmd()
        .args([
            "Launch",
            "--tokens",
            tokens.to_str().unwrap(),
            "--platforms",
            "myspace",
        ])
        .write_stdin("We shipped v1.0\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Platform not supported"));
}
