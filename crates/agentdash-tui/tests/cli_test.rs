//! Integration tests for the `agentdash` binary.
//!
//! Only paths that exit before the terminal is taken over are exercised:
//! help output, config printing and saving, and config validation.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

// ── Helpers ─────────────────────────────────────────────────────────

/// Command for the `agentdash` binary with config dirs pointed into `home`
/// and every `AGENTDASH_*` override cleared.
fn agentdash_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("agentdash");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("AGENTDASH_CONFIG")
        .env_remove("AGENTDASH_FEED_URL")
        .env_remove("AGENTDASH_API_URL")
        .env_remove("AGENTDASH_TIMEOUT")
        .env_remove("AGENTDASH_INSECURE");
    cmd
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn test_help_lists_flags() {
    let home = tempfile::tempdir().unwrap();
    agentdash_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--feed-url")
                .and(predicate::str::contains("--agent"))
                .and(predicate::str::contains("--print-config")),
        );
}

#[test]
fn test_print_config_shows_defaults() {
    let home = tempfile::tempdir().unwrap();
    agentdash_cmd(home.path())
        .arg("--print-config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("feed_url = \"ws://localhost:8080/monitoring\"")
                .and(predicate::str::contains("Business Analyst"))
                .and(predicate::str::contains("chart_window = 20")),
        );
}

#[test]
fn test_flags_override_config_file() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("dash.toml");
    std::fs::write(
        &config,
        "feed_url = \"ws://file.example:1/feed\"\n[[agents]]\nname = \"From File\"\n",
    )
    .unwrap();

    let output = agentdash_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["--feed-url", "wss://cli.example/feed"])
        .args(["--agent", "Reviewer", "--agent", "Tester"])
        .arg("--print-config")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wss://cli.example/feed"), "{stdout}");
    assert!(stdout.contains("Reviewer") && stdout.contains("Tester"), "{stdout}");
    assert!(!stdout.contains("From File"), "{stdout}");
}

#[test]
fn test_http_feed_url_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    agentdash_cmd(home.path())
        .args(["--feed-url", "http://localhost:8080/monitoring"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("feed_url"));
}

#[test]
fn test_save_config_writes_effective_config() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("nested").join("dash.toml");

    agentdash_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["--api-url", "http://ops.example:9000", "--agent", "Reviewer"])
        .arg("--save-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("api_url = \"http://ops.example:9000\""), "{written}");
    assert!(written.contains("Reviewer"), "{written}");
    assert!(!written.contains("Business Analyst"), "{written}");
}
