//! Integration tests for the command-line driver.

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(relative: &str) -> String {
    format!("{}/tests/fixtures/{relative}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn runs_a_valid_script() {
    let mut cmd = Command::cargo_bin("basil").unwrap();
    cmd.arg(fixture("simple.bas")).assert().success();
}

#[test]
fn parse_only_reports_resolution() {
    let mut cmd = Command::cargo_bin("basil").unwrap();
    cmd.arg("--parse-only")
        .arg(fixture("simple.bas"))
        .assert()
        .success()
        .stdout(predicate::str::contains("module simple resolved"));
}

#[test]
fn token_dump_lists_tokens() {
    let mut cmd = Command::cargo_bin("basil").unwrap();
    cmd.arg("--tokens")
        .arg(fixture("simple.bas"))
        .assert()
        .success()
        .stdout(predicate::str::contains("the keyword var"))
        .stdout(predicate::str::contains("an identifier \"total\""));
}

#[test]
fn missing_file_fails_with_diagnostic() {
    let mut cmd = Command::cargo_bin("basil").unwrap();
    cmd.arg(fixture("does_not_exist.bas"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn unresolved_load_fails_with_location() {
    let mut cmd = Command::cargo_bin("basil").unwrap();
    cmd.arg(fixture("missing_load.bas"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing_load.bas:1:1"))
        .stderr(predicate::str::contains("could not load module \"nowhere\""));
}
