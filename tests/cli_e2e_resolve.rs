//! End-to-end tests for the `resolve` and `completions` commands.

mod common;

use common::prelude::*;

const MIGRATED: &str = r#"version: v1
language: python
defaults:
  one_library_per: service
  transport: grpc+rest
name_overrides:
  google-cloud-tasks: cloud-tasks
versions:
  cloud-tasks: 1.0.0
libraries:
- name: google-cloud-core
- name: google-cloud-speech
  transport: grpc
"#;

fn fixture() -> TestFixture {
    TestFixture::new(fixtures::PYTHON_REPO)
        .with_repo_file("librarian.yaml", MIGRATED)
        .with_api("google/cloud/tasks/v2", "")
        .with_api("google/cloud/tasks/v2beta3", "")
        .with_api("google/cloud/speech/v1", "")
}

#[test]
fn test_resolve_json() {
    let fixture = fixture();
    let output = fixture
        .command()
        .arg("resolve")
        .arg("--config")
        .arg(fixture.repo().join("librarian.yaml"))
        .arg("--googleapis")
        .arg(fixture.googleapis())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let resolved: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let libraries = resolved.as_array().unwrap();
    let names: Vec<&str> = libraries
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cloud-tasks", "google-cloud-core", "google-cloud-speech"]);

    assert_eq!(libraries[0]["default_api"], "google/cloud/tasks/v2");
    assert_eq!(libraries[0]["explicit"], false);
    assert_eq!(libraries[0]["version"], "1.0.0");
    assert_eq!(libraries[0]["effective"]["transport"], "grpc+rest");
    assert!(libraries[1]["default_api"].is_null());
    assert_eq!(libraries[2]["effective"]["transport"], "grpc");
}

#[test]
fn test_resolve_table() {
    let fixture = fixture();
    fixture
        .command()
        .arg("resolve")
        .arg("--config")
        .arg(fixture.repo().join("librarian.yaml"))
        .arg("--googleapis")
        .arg(fixture.googleapis())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("LIBRARY"))
        .stdout(predicate::str::contains("google/cloud/tasks/v2\n"));
}

#[test]
fn test_resolve_yaml_normalizes() {
    let fixture = fixture();
    fixture
        .command()
        .arg("resolve")
        .arg("--config")
        .arg(fixture.repo().join("librarian.yaml"))
        .arg("--googleapis")
        .arg(fixture.googleapis())
        .args(["--format", "yaml"])
        .assert()
        .success()
        .stdout(MIGRATED);
}

#[test]
fn test_resolve_requires_policy() {
    let fixture = TestFixture::new(fixtures::PYTHON_REPO)
        .with_repo_file("librarian.yaml", "version: v1\nlanguage: python\n");
    fixture
        .command()
        .arg("resolve")
        .arg("--config")
        .arg(fixture.repo().join("librarian.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("one_library_per is not set"));
}

#[test]
fn test_resolve_missing_config_fails() {
    let fixture = TestFixture::new(fixtures::PYTHON_REPO);
    fixture
        .command()
        .args(["resolve", "--config", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
}

#[test]
fn test_completions_bash() {
    let fixture = TestFixture::new(fixtures::PYTHON_REPO);
    fixture
        .command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("librarian-migrate"));
}
