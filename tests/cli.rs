//! CLI behaviour that needs no backend: argument validation, settings
//! resolution and error formatting.

mod common;

use common::{TestEnv, closed_port};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_version_includes_build_metadata() {
    let env = TestEnv::new();
    env.sortline()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("commit:"))
        .stdout(predicate::str::contains("built:"));

    // short form is the bare version
    env.sortline()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit").not());
}

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();
    env.sortline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("sort-log"))
        .stdout(predicate::str::contains("autotest"));
}

#[test]
fn test_settings_defaults_without_file() {
    let env = TestEnv::new();
    let output = env
        .sortline()
        .args(["config", "settings"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["host"]["value"], "localhost");
    assert_eq!(report["host"]["source"], "default");
    assert_eq!(report["port"]["value"], "3000");
    assert_eq!(report["reconnect_delay_ms"]["value"], "3000");
    assert!(report.get("username").is_none());
}

#[test]
fn test_settings_precedence_cli_over_env_over_file() {
    let env = TestEnv::new();
    let path = env.write_settings(
        "host = \"file-host\"\nport = 4000\nlog-retention = 50\nusername = \"op\"\npassword = \"secret\"\n",
    );

    let output = env
        .sortline()
        .args(["config", "settings", "--config"])
        .arg(&path)
        .env("SORTLINE_HOST", "env-host")
        .env("SORTLINE_PORT", "5000")
        .args(["--port", "6000"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["host"]["value"], "env-host");
    assert_eq!(report["host"]["source"], "env:SORTLINE_HOST");
    assert_eq!(report["port"]["value"], "6000");
    assert_eq!(report["port"]["source"], "cli");
    assert_eq!(report["log_retention"]["value"], "50");
    assert_eq!(report["log_retention"]["source"], "file");
    assert_eq!(report["username"]["value"], "op");
    assert_eq!(report["password"]["value"], "***");
}

#[test]
fn test_settings_human_shows_file_and_sources() {
    let env = TestEnv::new();
    let path = env.write_settings("host = \"line-3.local\"\n");

    env.sortline()
        .args(["-H", "config", "settings"])
        .env("SORTLINE_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings file:"))
        .stdout(predicate::str::contains("settings.toml"))
        .stdout(predicate::str::contains("line-3.local"))
        .stdout(predicate::str::contains("(file)"));
}

#[test]
fn test_invalid_settings_file_names_path() {
    let env = TestEnv::new();
    let path = env.write_settings("port = \"not a number\"\n");

    env.sortline()
        .args(["-H", "config", "settings", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("settings.toml"));
}

#[test]
fn test_unknown_settings_key_rejected() {
    let env = TestEnv::new();
    let path = env.write_settings("colour = \"green\"\n");

    env.sortline()
        .args(["config", "settings", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_reconnect_delay_below_minimum_rejected() {
    let env = TestEnv::new();
    let path = env.write_settings("reconnect-delay-ms = 10\n");

    env.sortline()
        .args(["-H", "config", "settings", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("reconnect-delay-ms must be at least 100"));
}

#[test]
fn test_invalid_port_env_rejected() {
    let env = TestEnv::new();
    env.sortline()
        .args(["-H", "config", "settings"])
        .env("SORTLINE_PORT", "eighty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SORTLINE_PORT is not a valid port"));
}

#[test]
fn test_mock_requires_state() {
    let env = TestEnv::new();
    env.sortline()
        .args(["mock", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--state"));
}

#[test]
fn test_lane_zero_rejected_before_connecting() {
    let env = TestEnv::new();
    env.sortline()
        .args(["-H", "count", "reset", "0", "--port"])
        .arg(closed_port().to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("lane numbers start at 1"));
}

#[test]
fn test_relay_action_must_be_known() {
    let env = TestEnv::new();
    env.sortline()
        .args(["relay", "test", "1", "pull"])
        .assert()
        .failure();
}

#[test]
fn test_config_push_rejects_non_object() {
    let env = TestEnv::new();
    let file = env.write_file("config.json", "[1, 2]");

    env.sortline()
        .args(["-H", "config", "push", "--port"])
        .arg(closed_port().to_string())
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Dữ liệu config phải là một đối tượng JSON (Object).",
        ));
}

#[test]
fn test_config_push_rejects_invalid_json() {
    let env = TestEnv::new();
    let file = env.write_file("config.json", "{\"lanes_config\": ");

    let output = env
        .sortline()
        .args(["config", "push", "--port"])
        .arg(closed_port().to_string())
        .arg(&file)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(error["error"].as_str().unwrap().contains("EOF"));
}

#[test]
fn test_sort_log_rejects_zero_days() {
    let env = TestEnv::new();
    env.sortline()
        .args(["-H", "sort-log", "--days", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--days must be at least 1"));
}

#[test]
fn test_status_times_out_against_closed_port() {
    let env = TestEnv::new();
    let path = env.write_settings("reconnect-delay-ms = 100\n");

    env.sortline()
        .args(["-H", "status", "--timeout-secs", "1", "--host", "127.0.0.1", "--port"])
        .arg(closed_port().to_string())
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Timed out"));
}

#[test]
fn test_errors_are_json_by_default() {
    let env = TestEnv::new();
    let output = env
        .sortline()
        .args(["maintenance", "reset", "--host", "127.0.0.1", "--port"])
        .arg(closed_port().to_string())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(error["error"].as_str().unwrap().starts_with("HTTP error"));
    assert!(output.stdout.is_empty());
}
