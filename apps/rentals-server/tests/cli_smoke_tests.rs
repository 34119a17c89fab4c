//! CLI smoke tests for the rentals-server binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout;

fn run_rentals_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rentals-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute rentals-server")
}

/// Config rooted in `dir` so logs and the database stay inside the temp dir.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let yaml = format!(
        r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 0

database:
  url: "sqlite://db/rentals.db?mode=rwc"

logging:
  default:
    console_level: info
    file: "logs/rentals.log"
    file_level: debug
    max_backups: 1
    max_size_mb: 1
{extra}"#,
        home = dir.to_string_lossy().replace('\\', "/"),
    );
    std::fs::write(&path, yaml).expect("Failed to write config file");
    path
}

#[test]
fn help_lists_subcommands() {
    let output = run_rentals_server(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for word in ["run", "check", "promote", "--config", "--mock"] {
        assert!(stdout.contains(word), "help should mention {word}: {stdout}");
    }
}

#[test]
fn version_is_printed() {
    let output = run_rentals_server(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("rentals-server 0.1.0"));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_rentals_server(&["invalid-command"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[test]
fn missing_config_file_fails() {
    let output = run_rentals_server(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn invalid_yaml_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("invalid.yaml");
    std::fs::write(&path, "invalid: yaml: content: [unclosed").unwrap();

    let output = run_rentals_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid configuration"), "{stderr}");
}

#[test]
fn check_accepts_a_valid_config() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        tmp.path(),
        "modules:\n  rentals:\n    jwt_secret: \"smoke\"\n    default_page_size: 20\n",
    );

    let output = run_rentals_server(&["--config", path.to_str().unwrap(), "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("jwt_secret: smoke"));
}

#[test]
fn check_rejects_bad_module_config() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "modules:\n  rentals:\n    no_such_key: 1\n");

    let output = run_rentals_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rentals"));
}

#[test]
fn print_config_applies_overrides() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");

    let output = run_rentals_server(&[
        "--config",
        path.to_str().unwrap(),
        "--port",
        "9123",
        "--mock",
        "--print-config",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9123"), "{stdout}");
    assert!(stdout.contains("sqlite::memory:"), "{stdout}");
}

#[test]
fn promote_unknown_account_fails() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");

    let output = run_rentals_server(&[
        "--config",
        path.to_str().unwrap(),
        "--mock",
        "promote",
        "--email",
        "ghost@example.com",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ghost@example.com"));
}

#[tokio::test]
async fn run_keeps_serving_until_stopped() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_rentals-server"))
        .args(["--config", path.to_str().unwrap(), "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn rentals-server");

    // still running after startup means bind and migrations succeeded
    let waited = timeout(Duration::from_secs(3), child.wait()).await;
    assert!(waited.is_err(), "server exited early: {waited:?}");
    assert!(tmp.path().join("db/rentals.db").is_file());

    child.kill().await.unwrap();
}
