//! Integration tests for the fitlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - User registration and duplicate detection
//! - Appending exercises and querying the log
//! - CSV export
//! - Exit codes for each error kind

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("fitlog"))
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn create_user(data_dir: &Path, username: &str) -> String {
    let output = cli()
        .arg("new-user")
        .arg(username)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    stdout_json(&output)["id"]
        .as_str()
        .expect("id missing")
        .to_string()
}

fn add_exercise(data_dir: &Path, user_id: &str, description: &str, duration: &str, date: &str) {
    cli()
        .args(["add", "--user-id", user_id])
        .args(["--description", description])
        .args(["--duration", duration])
        .args(["--date", date])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise log tracker"));
}

#[test]
fn test_new_user_creates_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    let id = create_user(&data_dir, "alice");
    assert!(!id.is_empty());

    let store = fs::read_to_string(data_dir.join("users.json")).expect("Failed to read store");
    assert!(store.contains("\"alice\""));
    assert!(store.contains(&id));
}

#[test]
fn test_duplicate_username() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    create_user(&data_dir, "alice");

    cli()
        .args(["new-user", "alice"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Username already taken"));
}

#[test]
fn test_users_lists_in_creation_order() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    create_user(&data_dir, "bob");
    create_user(&data_dir, "alice");

    let output = cli()
        .arg("users")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let users = stdout_json(&output);
    let names: Vec<_> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["bob", "alice"]);
    assert!(users[0]["exercises"].as_array().unwrap().is_empty());
}

#[test]
fn test_add_exercise_output() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");

    let output = cli()
        .args(["add", "--user-id", id.as_str()])
        .args(["--description", "run", "--duration", "30", "--date", "2023-01-05"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let added = stdout_json(&output);
    assert_eq!(added["id"], id.as_str());
    assert_eq!(added["username"], "alice");
    assert_eq!(added["description"], "run");
    assert_eq!(added["duration"].as_f64(), Some(30.0));
    assert_eq!(added["date"], "Thu Jan 05 2023");
}

#[test]
fn test_add_unknown_user() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["add", "--user-id", "67e55044-10b1-426f-9247-bb680e5fe0c8"])
        .args(["--description", "run", "--duration", "30"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"error\""));
}

#[test]
fn test_add_invalid_input() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");

    cli()
        .args(["add", "--user-id", id.as_str()])
        .args(["--description", "run", "--duration", "thirty"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Invalid duration"));

    cli()
        .args(["add", "--user-id", id.as_str()])
        .args(["--description", "run", "--duration", "30", "--date", "someday"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Invalid date"));

    // Neither attempt reached the log
    let output = cli()
        .args(["log", "--user-id", id.as_str()])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&output)["count"], 0);
}

#[test]
fn test_log_date_range() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");

    add_exercise(&data_dir, &id, "first", "10", "2023-01-01");
    add_exercise(&data_dir, &id, "second", "20", "2023-01-10");
    add_exercise(&data_dir, &id, "third", "30", "2023-01-20");

    let output = cli()
        .args(["log", "--user-id", id.as_str()])
        .args(["--from", "2023-01-05", "--to", "2023-01-15"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let result = stdout_json(&output);
    assert_eq!(result["count"], 1);
    assert_eq!(result["log"][0]["description"], "second");
    assert_eq!(result["log"][0]["date"], "Tue Jan 10 2023");
}

#[test]
fn test_log_limit_keeps_order() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");

    for (i, date) in ["2023-01-05", "2023-01-01", "2023-01-04", "2023-01-02", "2023-01-03"]
        .iter()
        .enumerate()
    {
        add_exercise(&data_dir, &id, &format!("e{}", i), "5", date);
    }

    let output = cli()
        .args(["log", "--user-id", id.as_str(), "--limit", "2"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let result = stdout_json(&output);
    assert_eq!(result["count"], 2);
    assert_eq!(result["log"][0]["description"], "e0");
    assert_eq!(result["log"][1]["description"], "e1");
}

#[test]
fn test_log_ignores_bad_parameters() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");
    add_exercise(&data_dir, &id, "run", "30", "2023-01-05");

    cli()
        .args(["log", "--user-id", id.as_str()])
        .args(["--from", "whenever", "--limit", "-3"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 1"));
}

#[test]
fn test_export_to_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");
    add_exercise(&data_dir, &id, "run", "30", "2023-01-05");
    add_exercise(&data_dir, &id, "swim", "45", "2023-01-06");

    let csv_path = temp_dir.path().join("export.csv");
    cli()
        .args(["export", "--user-id", id.as_str()])
        .arg("--output")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 entries"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("description,duration,date"));
    assert!(csv_content.contains("swim,45.0,2023-01-06T00:00:00+00:00"));
}

#[test]
fn test_export_to_stdout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_user(&data_dir, "alice");
    add_exercise(&data_dir, &id, "run", "30", "2023-01-05");

    cli()
        .args(["export", "--user-id", id.as_str(), "--limit", "0"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout("description,duration,date\n");
}

#[test]
fn test_config_file_is_used() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("from-config");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[data]\ndata_dir = {:?}\n\n[store]\nlock_timeout_ms = 1000\n",
            data_dir.display().to_string()
        ),
    )
    .unwrap();

    cli()
        .args(["new-user", "alice"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    assert!(data_dir.join("users.json").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[store]\nlock_timeout_ms = 0\n").unwrap();

    cli()
        .arg("users")
        .arg("--config")
        .arg(&config_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Configuration error"));
}
