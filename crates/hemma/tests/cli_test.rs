//! Integration tests for the `hemma` CLI binary.
//!
//! These tests validate argument parsing, help output, shell
//! completions, and error handling — all without requiring a live hub.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hemma` binary with env isolation.
///
/// Clears all `HEMMA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration
/// or keyring entries.
fn hemma_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hemma");
    cmd.env("HOME", "/tmp/hemma-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hemma-cli-test-nonexistent")
        .env_remove("HEMMA_CONTEXT")
        .env_remove("HEMMA_OUTPUT")
        .env_remove("HEMMA_CFG_CURRENT_CONTEXT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hemma_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hemma_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("DIRIGERA")
            .and(predicate::str::contains("authorize"))
            .and(predicate::str::contains("listen"))
            .and(predicate::str::contains("list")),
    );
}

#[test]
fn test_version_flag() {
    hemma_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hemma"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hemma_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hemma_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hemma_cmd().arg("frobnicate").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("frobnicate"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_devices_without_context() {
    hemma_cmd()
        .args(["list", "devices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context"));
}

#[test]
fn test_listen_without_context() {
    hemma_cmd()
        .arg("listen")
        .assert()
        .failure()
        .stderr(predicate::str::contains("context"));
}

#[test]
fn test_use_unknown_context() {
    hemma_cmd()
        .args(["use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_invalid_output_format() {
    let output = hemma_cmd()
        .args(["--output", "invalid", "list", "devices"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_show_user_requires_id_or_me() {
    let output = hemma_cmd().args(["show", "user"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "usage error expected");
}

#[test]
fn test_authorize_rejects_context_with_no_context() {
    let output = hemma_cmd()
        .args([
            "authorize",
            "192.168.1.148",
            "--context",
            "home",
            "--no-context",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "conflicting flags");
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_list_subcommands_exist() {
    hemma_cmd()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hubs")
                .and(predicate::str::contains("contexts"))
                .and(predicate::str::contains("devices"))
                .and(predicate::str::contains("rooms"))
                .and(predicate::str::contains("scenes"))
                .and(predicate::str::contains("users")),
        );
}

#[test]
fn test_show_subcommands_exist() {
    hemma_cmd()
        .args(["show", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("device")
                .and(predicate::str::contains("room"))
                .and(predicate::str::contains("scene"))
                .and(predicate::str::contains("user"))
                .and(predicate::str::contains("token")),
        );
}

#[test]
fn test_global_flags_parse() {
    // Flags parse; the failure is about the missing context, not the
    // arguments themselves.
    hemma_cmd()
        .args(["--output", "json", "-v", "--quiet", "list", "devices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context"));
}
