//! Full-pipeline tests: project document in, version string out.

use std::path::Path;

use uv_dynamic_versioning::config::Project;
use uv_dynamic_versioning::core::env::BYPASS_ENV;
use uv_dynamic_versioning::core::{DynamicVersioningError, EnvSnapshot, Result};
use uv_dynamic_versioning::git::{QueryOptions, VcsReader};
use uv_dynamic_versioning::resolver::{Resolution, resolve};
use uv_dynamic_versioning::version::Version;

/// Stand-in for git: a canned descriptor, or a VCS failure when `None`.
struct StubReader(Option<Version>);

impl VcsReader for StubReader {
    fn query(&self, _options: &QueryOptions) -> Result<Version> {
        self.0
            .clone()
            .ok_or_else(|| DynamicVersioningError::vcs("describe", "stub failure"))
    }
}

fn run(document: &str, env: EnvSnapshot, reader: &StubReader) -> Result<Resolution> {
    let document: toml::Table = toml::from_str(document).unwrap();
    let config = Project::validate(&document).unwrap().config();
    resolve(Path::new("."), &config, &env, reader)
}

fn clean_tag(base: &str) -> StubReader {
    StubReader(Some(Version::new(base)))
}

fn ahead_of_tag(base: &str, distance: u64) -> StubReader {
    StubReader(Some(Version {
        distance,
        commit: Some("abc1234".to_string()),
        ..Version::new(base)
    }))
}

#[test]
fn bypass_wins_over_every_other_setting() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        format = "v{base}+{distance}"
        style = "semver"
        bump = true
    "#;
    let env = EnvSnapshot::from_pairs([(BYPASS_ENV, "1.1.1")]);
    let resolution = run(document, env, &StubReader(None)).unwrap();
    assert_eq!(resolution.serialized, "1.1.1");
    assert_eq!(resolution.version.base, "1.1.1");
}

#[test]
fn empty_bypass_behaves_like_unset() {
    let document = "[tool.uv-dynamic-versioning]\n";
    let env = EnvSnapshot::from_pairs([(BYPASS_ENV, "")]);
    let resolution = run(document, env, &clean_tag("1.0.0")).unwrap();
    assert_eq!(resolution.serialized, "1.0.0");
}

#[test]
fn default_configuration_at_clean_tag() {
    let document = "[tool.uv-dynamic-versioning]\n";
    let resolution = run(document, EnvSnapshot::default(), &clean_tag("1.0.0")).unwrap();
    assert_eq!(resolution.serialized, "1.0.0");
}

#[test]
fn prerelease_tag_serializes_with_default_style() {
    let document = "[tool.uv-dynamic-versioning]\n";
    let reader = StubReader(Some(Version::from_tag_parts("1.0.0", Some("alpha"), Some(1))));
    let resolution = run(document, EnvSnapshot::default(), &reader).unwrap();
    assert_eq!(resolution.serialized, "1.0.0a1");
}

#[test]
fn distance_appends_post_dev_and_commit() {
    let document = "[tool.uv-dynamic-versioning]\n";
    let resolution =
        run(document, EnvSnapshot::default(), &ahead_of_tag("1.0.0", 3)).unwrap();
    assert_eq!(resolution.serialized, "1.0.0.post3.dev0+abc1234");
}

#[test]
fn bumped_resolution_compares_greater() {
    let plain = run(
        "[tool.uv-dynamic-versioning]\n",
        EnvSnapshot::default(),
        &clean_tag("1.0.0"),
    )
    .unwrap();
    let bumped = run(
        "[tool.uv-dynamic-versioning]\nbump = true\n",
        EnvSnapshot::default(),
        &clean_tag("1.0.0"),
    )
    .unwrap();

    let plain = semver::Version::parse(&plain.serialized).unwrap();
    let bumped = semver::Version::parse(&bumped.serialized).unwrap();
    assert!(bumped > plain);
}

#[test]
fn template_bump_is_distance_gated() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        bump = true
        format-jinja = "{{- base }}"
    "#;

    let at_tag = run(document, EnvSnapshot::default(), &clean_tag("1.0.0")).unwrap();
    assert_eq!(at_tag.serialized, "1.0.0");

    let ahead = run(document, EnvSnapshot::default(), &ahead_of_tag("1.0.0", 2)).unwrap();
    assert_eq!(ahead.serialized, "1.0.1");
}

#[test]
fn template_with_semver_style_rejects_zero_padded_prerelease() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        style = "semver"
        format-jinja = "{{- base }}-01"
    "#;
    let err = run(document, EnvSnapshot::default(), &clean_tag("1.0.0")).unwrap_err();
    assert!(matches!(err, DynamicVersioningError::StyleViolation { .. }));
}

#[test]
fn template_sees_env_snapshot() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        format-jinja = "{{- base }}+{{ env.BUILD_ID }}"
    "#;
    let env = EnvSnapshot::from_pairs([("BUILD_ID", "42")]);
    let resolution = run(document, env, &clean_tag("1.0.0")).unwrap();
    assert_eq!(resolution.serialized, "1.0.0+42");
}

#[test]
fn fallback_version_absorbs_query_failure() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        fallback-version = "0.0.0"
    "#;
    let resolution = run(document, EnvSnapshot::default(), &StubReader(None)).unwrap();
    assert_eq!(resolution.serialized, "0.0.0");
    assert_eq!(resolution.version.distance, 0);
}

#[test]
fn query_failure_without_fallback_propagates() {
    let err = run(
        "[tool.uv-dynamic-versioning]\n",
        EnvSnapshot::default(),
        &StubReader(None),
    )
    .unwrap_err();
    assert!(matches!(err, DynamicVersioningError::Vcs { .. }));
}

#[test]
fn dirty_flag_appends_marker() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        dirty = true
    "#;
    let reader = StubReader(Some(Version {
        dirty: true,
        ..Version::new("1.0.0")
    }));
    let resolution = run(document, EnvSnapshot::default(), &reader).unwrap();
    assert_eq!(resolution.serialized, "1.0.0+dirty");
}

#[test]
fn tagged_metadata_flag_appends_tag_metadata() {
    let document = r#"
        [tool.uv-dynamic-versioning]
        tagged-metadata = true
    "#;
    let reader = StubReader(Some(Version {
        tagged_metadata: Some("linux".to_string()),
        ..Version::new("1.2.0")
    }));
    let resolution = run(document, EnvSnapshot::default(), &reader).unwrap();
    assert_eq!(resolution.serialized, "1.2.0+linux");
}
