//! CLI smoke tests for the stockroom-server binary: help/version output,
//! config validation paths, and a short-lived `run` against sqlite.

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_stockroom_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_stockroom-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute stockroom-server")
}

async fn run_stockroom_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_stockroom-server"));
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Config pointing every filesystem path into the given temp dir.
fn write_config(dir: &TempDir, name: &str, port: u16) -> String {
    let config_path = dir.path().join(name);
    let home_dir = dir.path().join("home");
    let config_content = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: {}

database:
  url: "sqlite://database/test.db"

logging:
  default:
    console_level: info
    file: ""
    file_level: info
"#,
        home_dir.display(),
        port
    );
    std::fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_str().unwrap().to_string()
}

#[test]
fn help_lists_subcommands_and_options() {
    let output = run_stockroom_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stockroom-server"));
    assert!(stdout.contains("Usage:") || stdout.contains("USAGE:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--mock"));
}

#[test]
fn version_prints_binary_name_and_number() {
    let output = run_stockroom_server(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stockroom-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let output = run_stockroom_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid") || stderr.contains("unrecognized"),
        "Should complain about the unknown command: {stderr}"
    );
}

#[test]
fn missing_config_file_is_a_hard_error() {
    let output = run_stockroom_server(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not found") || stderr.contains("config"),
        "Should mention the missing config file: {stderr}"
    );
}

#[test]
fn short_config_flag_behaves_like_the_long_one() {
    let output = run_stockroom_server(&["-c", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not found") || stderr.contains("config"),
        "Should mention the missing config file: {stderr}"
    );
}

#[test]
fn malformed_yaml_fails_check() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "server: [unclosed").expect("Failed to write file");

    let output = run_stockroom_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn unknown_config_keys_fail_check() {
    // Config sections are deny_unknown_fields; a typo must not pass silently.
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("typo.yaml");
    std::fs::write(
        &config_path,
        "server:\n  host: \"127.0.0.1\"\n  prot: 5000\n",
    )
    .expect("Failed to write file");

    let output = run_stockroom_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should reject unknown keys");
}

#[test]
fn check_succeeds_with_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "valid.yaml", 5000);

    let output = run_stockroom_server(&["--config", &config_path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn print_config_dumps_yaml_and_exits() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "print.yaml", 5999);

    let output = run_stockroom_server(&["--config", &config_path, "--print-config"]);
    assert!(output.status.success(), "print-config should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server:"));
    assert!(stdout.contains("port: 5999"));
    assert!(stdout.contains("auth:"));
    // The secret is part of the config; printing is opt-in and local only.
    assert!(stdout.contains("token_secret"));
}

#[test]
fn check_with_mock_ignores_the_configured_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("mock.yaml");
    let home_dir = temp_dir.path().join("home");
    // Deliberately unreachable postgres; --mock must not touch it.
    let config_content = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 5000

database:
  url: "postgresql://localhost:1/nonexistent"
"#,
        home_dir.display()
    );
    std::fs::write(&config_path, config_content).expect("Failed to write config file");

    let output = run_stockroom_server(&["--config", config_path.to_str().unwrap(), "--mock", "check"]);
    assert!(
        output.status.success(),
        "check --mock should not depend on the configured database"
    );
}

#[test]
fn verbose_flag_does_not_break_help() {
    let output = run_stockroom_server(&["-vv", "--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:") || stdout.contains("USAGE:"));
}

#[test]
fn subcommand_help_is_available() {
    for sub in ["run", "check"] {
        let output = run_stockroom_server(&[sub, "--help"]);
        assert!(output.status.success(), "{sub} --help should succeed");
    }
}

#[tokio::test]
async fn run_starts_with_sqlite_and_keeps_serving() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // Port 0 binds an ephemeral port, so parallel test runs never collide.
    let config_path = write_config(&temp_dir, "run.yaml", 0);

    let result = run_stockroom_server_with_timeout(
        &["--config", &config_path, "run"],
        Duration::from_secs(10),
    )
    .await;

    match result {
        // Timing out means the server was up and serving.
        Err(err) => assert!(
            err.to_string().contains("elapsed"),
            "Server failed to start: {err}"
        ),
        Ok(output) => {
            // An early exit is only acceptable if it was a clean one.
            assert!(
                output.status.success(),
                "Server exited with failure:\nSTDOUT: {}\nSTDERR: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
