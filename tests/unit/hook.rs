//! Metadata hook behavior driven by TOML-shaped configuration and metadata.

use uv_dynamic_versioning::config::MetadataHookConfig;
use uv_dynamic_versioning::core::{DynamicVersioningError, EnvSnapshot};
use uv_dynamic_versioning::plugin::MetadataHook;
use uv_dynamic_versioning::version::Version;

fn hook(config_toml: &str, version: Version) -> MetadataHook {
    let table: toml::Table = toml::from_str(config_toml).unwrap();
    let config = MetadataHookConfig::validate(&table).unwrap();
    MetadataHook::new(config, version, EnvSnapshot::default())
}

#[test]
fn no_dynamic_field_raises() {
    let hook = hook(
        r#"dependencies = ["foo=={{ version }}"]"#,
        Version::new("1.0.0"),
    );
    let mut metadata = toml::Table::new();
    let err = hook.update(&mut metadata).unwrap_err();
    assert!(matches!(err, DynamicVersioningError::MetadataConflict { .. }));
}

#[test]
fn dynamic_without_hook_config_raises() {
    let hook = hook("", Version::new("1.0.0"));
    let mut metadata: toml::Table = toml::from_str(r#"dynamic = ["dependencies"]"#).unwrap();
    assert!(hook.update(&mut metadata).is_err());
}

#[test]
fn dynamic_field_with_static_value_conflicts() {
    let hook = hook(
        r#"optional-dependencies = { extra = ["foo=={{ version }}"] }"#,
        Version::new("1.0.0"),
    );
    let mut metadata: toml::Table = toml::from_str(
        r#"
        dynamic = ["optional-dependencies"]
        [optional-dependencies]
        extra = ["bar==1.0"]
        "#,
    )
    .unwrap();
    let err = hook.update(&mut metadata).unwrap_err();
    assert!(err.to_string().contains("already listed"));
}

#[test]
fn single_template_renders_resolved_version() {
    let hook = hook(
        r#"dependencies = ["foo=={{ version }}"]"#,
        Version::new("1.0.0"),
    );
    let mut metadata: toml::Table = toml::from_str(r#"dynamic = ["dependencies"]"#).unwrap();
    hook.update(&mut metadata).unwrap();

    let deps: Vec<&str> = metadata["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert_eq!(deps, vec!["foo==1.0.0"]);
}

#[test]
fn templates_can_use_derived_fields() {
    let version = Version {
        branch: Some("feature/new-branch".to_string()),
        ..Version::new("2.3.4")
    };
    let hook = hook(
        r#"dependencies = ["pkg=={{ major }}.{{ minor }}.*", "trace=={{ branch_escaped }}"]"#,
        version,
    );
    let mut metadata: toml::Table = toml::from_str(r#"dynamic = ["dependencies"]"#).unwrap();
    hook.update(&mut metadata).unwrap();

    let deps: Vec<&str> = metadata["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert_eq!(deps, vec!["pkg==2.3.*", "trace==featurenewbranch"]);
}

#[test]
fn bad_template_surfaces_render_error() {
    let hook = hook(
        r#"dependencies = ["foo=={{ nonsense }}"]"#,
        Version::new("1.0.0"),
    );
    let mut metadata: toml::Table = toml::from_str(r#"dynamic = ["dependencies"]"#).unwrap();
    let err = hook.update(&mut metadata).unwrap_err();
    assert!(matches!(err, DynamicVersioningError::TemplateRender { .. }));
}
