//! Integration tests for the qatrack CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.
//! Each test gets its own data directory so state never leaks between
//! them.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a qatrack command isolated from ambient configuration
fn qatrack(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qatrack").unwrap();
    cmd.env_remove("QATRACK_DATA_DIR")
        .env_remove("QATRACK_REMOTE_DB")
        .env_remove("QATRACK_AUTH_USER")
        .env_remove("QATRACK_AUTH_EMAIL")
        .arg("--data-dir")
        .arg(data_dir.path());
    cmd
}

#[test]
fn help_displays() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("QA test tracking"));
}

#[test]
fn project_list_shows_defaults() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CBP"))
        .stdout(predicate::str::contains("WMA"));
}

#[test]
fn project_create_then_list() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["project", "create", "--name", "Loan Origination", "--code", "lop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project LOP"));

    qatrack(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loan Origination"));
}

#[test]
fn duplicate_short_code_is_rejected() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["project", "create", "--name", "First", "--code", "ABC"])
        .assert()
        .success();

    qatrack(&tmp)
        .args(["project", "create", "--name", "Second", "--code", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn default_projects_cannot_be_deleted() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["project", "delete", "credit-bureau-portal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot delete default projects"));
}

#[test]
fn project_update_changes_phase() {
    let tmp = TempDir::new().unwrap();
    let output = qatrack(&tmp)
        .args(["project", "create", "--name", "Loan Origination", "--code", "LOP"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Output format: "Created project LOP (loan-origination-XXXX)"
    let id = stdout
        .split('(')
        .nth(1)
        .and_then(|s| s.split(')').next())
        .unwrap()
        .to_string();

    qatrack(&tmp)
        .args(["project", "update", &id, "--phase", "uat"])
        .assert()
        .success();

    qatrack(&tmp)
        .args(["project", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase:       uat"));
}

#[test]
fn export_import_round_trip() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let out = source.path().join("bundle.json");

    qatrack(&source)
        .args(["export", "--project", "credit-bureau-portal", "-o"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());

    qatrack(&target)
        .arg("import")
        .arg(&out)
        .args(["--project", "credit-bureau-portal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported"));
}

#[test]
fn export_writes_valid_json() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("bundle.json");
    qatrack(&tmp)
        .args(["export", "-o"])
        .arg(&out)
        .assert()
        .success();

    let contents = fs::read_to_string(&out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(parsed["exportDate"].is_string());
    assert!(parsed["testCases"].is_array());
}

#[test]
fn report_test_cases_emits_csv_header() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["report", "test-cases"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "testCaseId,module,scenario,expectedResult",
        ));
}

#[test]
fn sync_status_reports_offline_without_remote() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("offline"));
}

#[test]
fn sync_pull_with_remote_succeeds() {
    let tmp = TempDir::new().unwrap();
    let remote_db = tmp.path().join("remote.db");
    qatrack(&tmp)
        .arg("--remote-db")
        .arg(&remote_db)
        .args(["sync", "pull"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pulled 0 record(s)"));
}

#[test]
fn stats_summarize_the_catalog() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects: 2 total, 2 active"));
}

#[test]
fn stats_for_unknown_project_fail() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["stats", "--project", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found"));
}

#[test]
fn auth_login_whoami_logout() {
    let tmp = TempDir::new().unwrap();
    qatrack(&tmp)
        .args(["auth", "login", "qa@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as qa@example.com"));

    qatrack(&tmp)
        .args(["auth", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qa@example.com"));

    qatrack(&tmp)
        .args(["auth", "logout"])
        .assert()
        .success();

    qatrack(&tmp)
        .args(["auth", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn migrate_with_nothing_to_do() {
    let tmp = TempDir::new().unwrap();
    let remote_db = tmp.path().join("remote.db");
    qatrack(&tmp)
        .arg("--remote-db")
        .arg(&remote_db)
        .args(["project", "migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects needed migration"));
}
