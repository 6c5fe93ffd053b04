//! CLI smoke tests for the roster-server binary
//!
//! These tests verify the CLI surface: help output, configuration
//! validation and a real server start answering HTTP.

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{sleep, timeout, Instant};

/// Helper to run the roster-server binary with given arguments
fn run_roster_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_roster-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute roster-server")
}

/// Config with home_dir inside `dir`, so logs and databases stay in the temp dir
fn write_config(dir: &TempDir, name: &str, body: &str) -> String {
    let home = dir.path().to_string_lossy().replace('\\', "/");
    let content = format!("server:\n  home_dir: \"{home}\"\n  host: \"127.0.0.1\"\n  port: 8087\n{body}");
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

const QUIET_LOGGING: &str = r#"
logging:
  default:
    console_level: error
    file: ""
"#;

#[test]
fn test_cli_help_command() {
    let output = run_roster_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roster-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_roster_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roster-server 0.1.0"), "{stdout}");
}

#[test]
fn test_cli_invalid_command() {
    let output = run_roster_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "{stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_roster_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config") || stderr.contains("found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_roster_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        &temp_dir,
        "valid.yaml",
        &format!("database:\n  url: \"sqlite://data/roster.db\"\n{QUIET_LOGGING}"),
    );

    let output = run_roster_server(&["--config", &config_path, "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Should succeed with valid config: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Configuration check passed"), "{stdout}");
    // relative sqlite paths resolve under home_dir
    assert!(temp_dir.path().join("data").is_dir());
}

#[test]
fn test_cli_rejects_non_sqlite_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        &temp_dir,
        "pg.yaml",
        &format!("database:\n  url: \"postgresql://localhost/nonexistent\"\n{QUIET_LOGGING}"),
    );

    let output = run_roster_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sqlite://"), "{stderr}");
}

#[test]
fn test_cli_mock_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        &temp_dir,
        "mock.yaml",
        &format!("database:\n  url: \"postgresql://localhost/nonexistent\"\n{QUIET_LOGGING}"),
    );

    // --mock swaps in an in-memory database
    let output = run_roster_server(&["--config", &config_path, "--mock", "check"]);

    assert!(
        output.status.success(),
        "Should succeed with mock database: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_unknown_config_key_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "typo.yaml", "databse:\n  url: \"sqlite::memory:\"\n");

    let output = run_roster_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success(), "Unknown top-level keys should fail");
}

#[test]
fn test_cli_print_config_shows_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "print.yaml", QUIET_LOGGING);

    let output = run_roster_server(&["--config", &config_path, "--port", "9191", "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"), "{stdout}");
    assert!(stdout.contains("127.0.0.1:9191"), "ingress follows --port: {stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_roster_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_roster_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port()
}

async fn http_post(port: u16, path: &str, body: &str) -> std::io::Result<String> {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await?;
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await?;
    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

#[tokio::test]
async fn test_cli_run_serves_roster_api_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "run.yaml", QUIET_LOGGING);
    let port = free_port();
    let port_arg = port.to_string();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_roster-server"))
        .args(["--config", &config_path, "--mock", "--port", &port_arg, "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn roster-server");

    let deadline = Instant::now() + Duration::from_secs(20);
    let response = loop {
        let attempt = timeout(
            Duration::from_secs(2),
            http_post(
                port,
                "/auth/register",
                r#"{"email":"ada@example.com","password":"secret1"}"#,
            ),
        )
        .await;
        match attempt {
            Ok(Ok(resp)) => break resp,
            _ if Instant::now() < deadline => sleep(Duration::from_millis(200)).await,
            _ => panic!("server did not answer on port {port}"),
        }
    };

    assert!(response.starts_with("HTTP/1.1 201"), "{response}");
    assert!(response.contains("\"token\""), "{response}");

    child.kill().await.expect("kill");
}
