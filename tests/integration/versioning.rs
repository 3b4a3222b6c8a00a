//! Resolution against real scratch repositories.

use uv_dynamic_versioning::config::UvDynamicVersioning;
use uv_dynamic_versioning::core::{DynamicVersioningError, EnvSnapshot};
use uv_dynamic_versioning::git::{GitReader, QueryOptions, VcsReader};
use uv_dynamic_versioning::plugin::{MetadataHook, VersionSource};
use uv_dynamic_versioning::resolver::resolve;

use crate::common::TestProject;

fn config_from(body: &str) -> UvDynamicVersioning {
    let table: toml::Table = toml::from_str(body).unwrap();
    UvDynamicVersioning::validate(&table).unwrap()
}

fn resolve_with(project: &TestProject, config: &UvDynamicVersioning) -> String {
    let reader = GitReader::new(project.path());
    resolve(project.path(), config, &EnvSnapshot::default(), &reader)
        .unwrap()
        .serialized
}

#[test]
fn clean_tag_resolves_to_base() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");

    let reader = GitReader::new(project.path());
    let version = reader.query(&QueryOptions::default()).unwrap();
    assert_eq!(version.base, "1.0.0");
    assert_eq!(version.distance, 0);
    assert!(!version.dirty);
    assert!(version.commit.is_some());
    assert!(version.timestamp.is_some());

    assert_eq!(
        resolve_with(&project, &UvDynamicVersioning::default()),
        "1.0.0"
    );
}

#[test]
fn prerelease_tag_resolves_with_stage() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0-alpha1");

    assert_eq!(
        resolve_with(&project, &UvDynamicVersioning::default()),
        "1.0.0a1"
    );
}

#[test]
fn distance_counts_commits_since_tag() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.commit("one");
    project.commit("two");

    let reader = GitReader::new(project.path());
    let version = reader.query(&QueryOptions::default()).unwrap();
    assert_eq!(version.distance, 2);

    let serialized = resolve_with(&project, &UvDynamicVersioning::default());
    assert!(
        serialized.starts_with("1.0.0.post2.dev0+"),
        "unexpected serialization: {serialized}"
    );
}

#[test]
fn nearest_matching_tag_wins() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.commit("next");
    project.tag("v1.1.0");

    assert_eq!(
        resolve_with(&project, &UvDynamicVersioning::default()),
        "1.1.0"
    );
}

#[test]
fn untracked_files_make_the_tree_dirty() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_file("scratch.txt", "uncommitted");

    let reader = GitReader::new(project.path());
    assert!(reader.query(&QueryOptions::default()).unwrap().dirty);

    let options = QueryOptions {
        ignore_untracked: true,
        ..QueryOptions::default()
    };
    assert!(!reader.query(&options).unwrap().dirty);
}

#[test]
fn no_matching_tag_degrades_or_fails_under_strict() {
    let project = TestProject::with_repo();
    project.commit("two commits, no tags");

    let reader = GitReader::new(project.path());
    let version = reader.query(&QueryOptions::default()).unwrap();
    assert_eq!(version.base, "0.0.0");
    assert_eq!(version.distance, 2);

    let options = QueryOptions {
        strict: true,
        ..QueryOptions::default()
    };
    let err = reader.query(&options).unwrap_err();
    assert!(matches!(err, DynamicVersioningError::Vcs { .. }));
}

#[test]
fn pattern_prefix_matches_prefixed_tags() {
    let project = TestProject::with_repo();
    project.tag("app-v2.0.0");

    let config = config_from(r#"pattern-prefix = "app-""#);
    assert_eq!(resolve_with(&project, &config), "2.0.0");
}

#[test]
fn custom_pattern_matches_bespoke_tags() {
    let project = TestProject::with_repo();
    project.tag("release-3.1");

    let config = config_from(r#"pattern = "^release-(?P<base>\\d+(\\.\\d+)*)$""#);
    assert_eq!(resolve_with(&project, &config), "3.1");
}

#[test]
fn commit_length_and_prefix_shape_the_commit_id() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");

    let config = config_from("commit-length = 8\ncommit-prefix = \"g\"");
    let reader = GitReader::new(project.path());
    let version = reader.query(&QueryOptions::from_config(&config)).unwrap();
    let commit = version.commit.unwrap();
    assert_eq!(commit.len(), 9);
    assert!(commit.starts_with('g'));
}

#[test]
fn fallback_version_covers_missing_repository() {
    let project = TestProject::new();

    let config = config_from(r#"fallback-version = "0.1.0""#);
    assert_eq!(resolve_with(&project, &config), "0.1.0");

    let reader = GitReader::new(project.path());
    let err = resolve(
        project.path(),
        &UvDynamicVersioning::default(),
        &EnvSnapshot::default(),
        &reader,
    )
    .unwrap_err();
    assert!(matches!(err, DynamicVersioningError::Vcs { .. }));
}

#[test]
fn version_source_reads_pyproject() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_pyproject(
        r#"
[tool.uv-dynamic-versioning]
vcs = "git"
"#,
    );

    let source = VersionSource::new(project.path());
    let data = source.get_version_data().unwrap();
    assert_eq!(data.version, "1.0.0");
}

#[test]
fn metadata_hook_renders_from_project_root() {
    let project = TestProject::with_repo();
    project.tag("v1.0.0");
    project.write_pyproject(
        r#"
[tool.uv-dynamic-versioning]
vcs = "git"

[tool.uv-dynamic-versioning.metadata-hook]
dependencies = ["mypkg-core=={{ version }}"]
"#,
    );

    let hook = MetadataHook::from_root(project.path()).unwrap();
    let mut metadata: toml::Table = toml::from_str(r#"dynamic = ["dependencies"]"#).unwrap();
    hook.update(&mut metadata).unwrap();

    let deps: Vec<&str> = metadata["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert_eq!(deps, vec!["mypkg-core==1.0.0"]);
}
