//! CLI surface tests for the docvault binary.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("docvault").expect("failed to find binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_names_the_server() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("document store"));
}

#[test]
fn test_missing_subcommand_fails_with_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_serve_help_lists_flags() {
    cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--secret-key"))
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn test_serve_rejects_missing_config_file() {
    cmd()
        .args(["serve", "--config", "/nonexistent/docvault.toml"])
        .assert()
        .failure();
}

#[test]
fn test_serve_rejects_invalid_port() {
    cmd()
        .args(["serve", "--port", "notaport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
