// ABOUTME: Integration tests for the anevazo CLI surface.
// ABOUTME: Validates help output and argument validation, nothing remote.

use assert_cmd::Command;
use predicates::prelude::*;

fn anevazo_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("anevazo"))
}

#[test]
fn help_shows_commands() {
    anevazo_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("env"));
}

#[test]
fn push_requires_a_name() {
    anevazo_cmd()
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME"));
}

#[test]
fn push_git_requires_a_revision() {
    anevazo_cmd()
        .args(["push", "demo", "--git", "https://git.example.com/demo.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rev"));
}

#[test]
fn env_set_requires_assignments() {
    anevazo_cmd()
        .args(["env", "set", "demo"])
        .assert()
        .failure();
}

#[test]
fn quiet_and_json_conflict() {
    anevazo_cmd()
        .args(["--quiet", "--json", "uninstall"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
