//! The compiled binary's stdout/stderr/exit-code contract.

use assert_cmd::Command;
use predicates::prelude::*;

use uv_dynamic_versioning::core::env::BYPASS_ENV;

use crate::common::TestProject;

fn binary() -> Command {
    Command::cargo_bin("uv-dynamic-versioning").expect("binary builds")
}

fn tagged_project() -> TestProject {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_pyproject("[tool.uv-dynamic-versioning]\n");
    project
}

#[test]
fn prints_resolved_version() {
    let project = tagged_project();
    binary()
        .current_dir(project.path())
        .env_remove(BYPASS_ENV)
        .assert()
        .success()
        .stdout("1.0.0\n");
}

#[test]
fn root_flag_resolves_other_directory() {
    let project = tagged_project();
    binary()
        .arg("--root")
        .arg(project.path())
        .env_remove(BYPASS_ENV)
        .assert()
        .success()
        .stdout("1.0.0\n");
}

#[test]
fn bypass_overrides_configuration() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_pyproject(
        r#"
[tool.uv-dynamic-versioning]
format = "v{base}+{distance}"
"#,
    );

    binary()
        .current_dir(project.path())
        .env(BYPASS_ENV, "9.9.9")
        .assert()
        .success()
        .stdout("9.9.9\n");
}

#[test]
fn missing_pyproject_fails_with_report() {
    let project = TestProject::new();
    binary()
        .current_dir(project.path())
        .env_remove(BYPASS_ENV)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn invalid_configuration_fails_with_report() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_pyproject(
        r#"
[tool.uv-dynamic-versioning]
vcs = "not-a-vcs"
"#,
    );

    binary()
        .current_dir(project.path())
        .env_remove(BYPASS_ENV)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
