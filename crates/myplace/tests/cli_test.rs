//! Integration tests for the `myplace` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config handling, and error exit codes without a live hub.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `myplace` binary with env isolation.
///
/// Clears all `MYPLACE_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn myplace_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("myplace");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MYPLACE_PROFILE")
        .env_remove("MYPLACE_HOST")
        .env_remove("MYPLACE_PORT")
        .env_remove("MYPLACE_CLIENT_ID")
        .env_remove("MYPLACE_SECRET")
        .env_remove("MYPLACE_OUTPUT")
        .env_remove("MYPLACE_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = myplace_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("MyPlace")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("set-temp"))
            .and(predicate::str::contains("set-mode")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("myplace"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("myplace"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_unknown_mode_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["set-mode", "Living", "turbo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("turbo"));
}

#[test]
fn test_missing_temperature_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["set-temp", "Living"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_hub_configured() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No hub configured"));
}

#[test]
fn test_host_without_secret_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["status", "--host", "127.0.0.1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No client secret"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["status", "--profile", "attic"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("attic"));
}

#[test]
fn test_unreachable_hub_leaves_state_unavailable() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args([
            "status", "--host", "127.0.0.1", "--port", "1", "--secret", "pw", "--timeout", "1",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Hub state unavailable"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_path_under_config_home() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show_masks_secret() {
    let home = tempfile::tempdir().unwrap();

    myplace_cmd(home.path())
        .args([
            "config", "init", "--host", "192.168.1.40", "--secret", "hunter2", "--port", "2026",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("written"));

    myplace_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("host = \"192.168.1.40\"")
                .and(predicate::str::contains("port = 2026"))
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );

    myplace_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();
    let init = |extra: &[&str]| {
        let mut cmd = myplace_cmd(home.path());
        cmd.args(["config", "init", "--host", "hub.local", "--secret-env", "HUB_SECRET"])
            .args(extra);
        cmd
    };

    init(&[]).assert().success();
    init(&[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));
    init(&["--force"]).assert().success();
}

#[test]
fn test_profile_secret_env_is_used() {
    let home = tempfile::tempdir().unwrap();
    myplace_cmd(home.path())
        .args([
            "config", "init", "--host", "127.0.0.1", "--port", "1", "--secret-env", "HUB_SECRET",
        ])
        .assert()
        .success();

    // Secret resolves, so the failure is the unreachable hub.
    myplace_cmd(home.path())
        .env("HUB_SECRET", "pw")
        .args(["status", "--timeout", "1"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(6);
}
