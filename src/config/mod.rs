//! Configuration parsing and validation for `[tool.uv-dynamic-versioning]`.
//!
//! The host reads `pyproject.toml` and hands this module the parsed
//! [`toml::Table`]; nothing here touches the filesystem. Validation turns
//! the raw mapping into an immutable, strongly-typed [`UvDynamicVersioning`]
//! with defaults applied.
//!
//! # Key Normalization
//!
//! Field names may be spelled hyphenated (`fallback-version`) or underscored
//! (`fallback_version`). Both map to the same field through a single stable
//! normalization pass; supplying *both* spellings of one key is rejected
//! with a validation error rather than resolved by iteration order. Unknown
//! keys are ignored.
//!
//! # Sum-Typed Fields
//!
//! `bump` accepts either a boolean or an inline table and is normalized to
//! [`BumpConfig`] at the validation boundary, so downstream code only ever
//! sees the structured form. `bump = true` is sugar for
//! `{ enable = true, index = -1 }`.
//!
//! # Examples
//!
//! ```rust
//! use uv_dynamic_versioning::config::UvDynamicVersioning;
//!
//! let table: toml::Table = toml::from_str(
//!     r#"
//!     vcs = "git"
//!     style = "pep440"
//!     bump = true
//!     fallback-version = "0.0.0"
//!     "#,
//! )
//! .unwrap();
//! let config = UvDynamicVersioning::validate(&table).unwrap();
//! assert!(config.bump.enable);
//! assert_eq!(config.bump.index, -1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{DynamicVersioningError, Result};
use crate::version::Style;

/// The version-control systems a project may declare.
///
/// All of the reference tool's names validate; kinds without a shipped
/// reader fail at query time with a VCS error, not at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vcs {
    /// Auto-detect (behaves like git in this implementation).
    #[default]
    Any,
    /// Git.
    Git,
    /// Mercurial.
    Mercurial,
    /// Darcs.
    Darcs,
    /// Subversion.
    Subversion,
    /// Bazaar.
    Bazaar,
    /// Fossil.
    Fossil,
    /// Pijul.
    Pijul,
}

impl std::fmt::Display for Vcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Git => "git",
            Self::Mercurial => "mercurial",
            Self::Darcs => "darcs",
            Self::Subversion => "subversion",
            Self::Bazaar => "bazaar",
            Self::Fossil => "fossil",
            Self::Pijul => "pijul",
        };
        write!(f, "{name}")
    }
}

/// Structured bump policy, the normalized form of the `bump` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Whether bumping is enabled at all.
    pub enable: bool,
    /// Base component to bump; negative indices count from the end.
    pub index: i64,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            enable: false,
            index: -1,
        }
    }
}

/// Read the version from a file instead of querying the VCS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FromFile {
    /// Path of the file, relative to the project root.
    pub source: String,
    /// Optional regex whose first capture group extracts the version.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Validated plugin configuration with defaults.
///
/// Immutable once constructed; the effective bump configuration is computed
/// during validation, never lazily.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UvDynamicVersioning {
    /// VCS kind to query.
    pub vcs: Vcs,
    /// Commit-id metadata policy: `Some(true)` always, `Some(false)` never,
    /// `None` only at nonzero distance.
    pub metadata: Option<bool>,
    /// Append tag-extracted metadata to the default serialization.
    pub tagged_metadata: bool,
    /// Append a dirty marker to the default serialization.
    pub dirty: bool,
    /// Tag grammar: `"default"`, `"default-unprefixed"`, or a custom regex
    /// with a `base` named group.
    pub pattern: String,
    /// Literal prefix stripped from tags before the pattern is applied.
    pub pattern_prefix: Option<String>,
    /// Plain placeholder template (e.g. `"v{base}+{distance}"`).
    pub format: Option<String>,
    /// Template expression; takes precedence over `format` when both are set.
    pub format_jinja: Option<String>,
    /// Style constraint for the rendered version.
    pub style: Option<Style>,
    /// Consider only the most recent tag instead of searching backwards.
    pub latest_tag: bool,
    /// Fail when no matching tag exists instead of falling back to 0.0.0.
    pub strict: bool,
    /// Tag directory, for VCS kinds that scope tags to a directory.
    pub tag_dir: String,
    /// Branch to search for tags, when set.
    pub tag_branch: Option<String>,
    /// Use the full commit id instead of the short form.
    pub full_commit: bool,
    /// Ignore untracked files when deciding dirtiness.
    pub ignore_untracked: bool,
    /// Truncate the commit id to this many characters.
    pub commit_length: Option<u32>,
    /// Prefix prepended to the commit id (e.g. `"g"`).
    pub commit_prefix: Option<String>,
    /// Replacement for non-alphanumeric characters in `branch_escaped`
    /// (default: remove them).
    pub escape_with: Option<String>,
    /// Bump policy, normalized from `bool | table`.
    #[serde(deserialize_with = "deserialize_bump")]
    pub bump: BumpConfig,
    /// Version used when the VCS query fails.
    pub fallback_version: Option<String>,
    /// Read the version from a file instead of the VCS.
    pub from_file: Option<FromFile>,
}

impl Default for UvDynamicVersioning {
    fn default() -> Self {
        Self {
            vcs: Vcs::Any,
            metadata: None,
            tagged_metadata: false,
            dirty: false,
            pattern: "default".to_string(),
            pattern_prefix: None,
            format: None,
            format_jinja: None,
            style: None,
            latest_tag: false,
            strict: false,
            tag_dir: "tags".to_string(),
            tag_branch: None,
            full_commit: false,
            ignore_untracked: false,
            commit_length: None,
            commit_prefix: None,
            escape_with: None,
            bump: BumpConfig::default(),
            fallback_version: None,
            from_file: None,
        }
    }
}

impl UvDynamicVersioning {
    /// Validate a raw `[tool.uv-dynamic-versioning]` table.
    ///
    /// Key spellings are normalized first (duplicates raise), the `bump`
    /// shape is pre-checked so the error names the field, then the table is
    /// deserialized with defaults. Unknown keys are ignored; unknown enum
    /// values and wrong primitive types raise
    /// [`DynamicVersioningError::Validation`].
    pub fn validate(table: &toml::Table) -> Result<Self> {
        let mut normalized = normalize_keys(table)?;

        if let Some(bump) = normalized.remove("bump") {
            let bump = match bump {
                flag @ toml::Value::Boolean(_) => flag,
                toml::Value::Table(inner) => toml::Value::Table(normalize_keys(&inner)?),
                _ => {
                    return Err(DynamicVersioningError::validation(
                        "bump must be a boolean or a table",
                    ));
                }
            };
            normalized.insert("bump".to_string(), bump);
        }
        if let Some(from_file) = normalized.remove("from_file") {
            let from_file = match from_file {
                toml::Value::Table(inner) => toml::Value::Table(normalize_keys(&inner)?),
                _ => {
                    return Err(DynamicVersioningError::validation(
                        "from-file must be a table",
                    ));
                }
            };
            normalized.insert("from_file".to_string(), from_file);
        }

        toml::Value::Table(normalized)
            .try_into()
            .map_err(|e: toml::de::Error| DynamicVersioningError::validation(e.to_string()))
    }
}

/// `bump = true | false | { enable = ..., index = ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BumpSetting {
    Flag(bool),
    Structured(BumpConfig),
}

fn deserialize_bump<'de, D>(deserializer: D) -> std::result::Result<BumpConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BumpSetting::deserialize(deserializer)? {
        BumpSetting::Flag(enable) => BumpConfig {
            enable,
            ..BumpConfig::default()
        },
        BumpSetting::Structured(config) => config,
    })
}

/// The `[tool]` table of the project document.
#[derive(Debug, Clone, Default)]
pub struct Tool {
    /// The plugin's own table, when present.
    pub uv_dynamic_versioning: Option<UvDynamicVersioning>,
}

impl Tool {
    /// Validate a raw `[tool]` table.
    pub fn validate(table: &toml::Table) -> Result<Self> {
        let normalized = normalize_keys(table)?;
        let uv_dynamic_versioning = match normalized.get("uv_dynamic_versioning") {
            None => None,
            Some(toml::Value::Table(inner)) => Some(UvDynamicVersioning::validate(inner)?),
            Some(_) => {
                return Err(DynamicVersioningError::validation(
                    "uv-dynamic-versioning must be a table",
                ));
            }
        };
        Ok(Self {
            uv_dynamic_versioning,
        })
    }
}

/// A validated project document.
#[derive(Debug, Clone)]
pub struct Project {
    /// The `[tool]` table.
    pub tool: Tool,
}

impl Project {
    /// Validate a parsed project document. The document must carry a
    /// `[tool]` table (possibly empty).
    pub fn validate(document: &toml::Table) -> Result<Self> {
        let tool = match document.get("tool") {
            Some(toml::Value::Table(table)) => Tool::validate(table)?,
            Some(_) => {
                return Err(DynamicVersioningError::validation("tool must be a table"));
            }
            None => {
                return Err(DynamicVersioningError::validation(
                    "project must have a 'tool' table",
                ));
            }
        };
        Ok(Self { tool })
    }

    /// The plugin configuration, or defaults when the table is absent.
    #[must_use]
    pub fn config(&self) -> UvDynamicVersioning {
        self.tool.uv_dynamic_versioning.clone().unwrap_or_default()
    }
}

/// Configuration for the metadata hook adapter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetadataHookConfig {
    /// Dependency template strings for `project.dependencies`.
    pub dependencies: Option<Vec<String>>,
    /// Extra-name to dependency template strings for
    /// `project.optional-dependencies`.
    pub optional_dependencies: Option<BTreeMap<String, Vec<String>>>,
}

impl MetadataHookConfig {
    /// Validate a raw metadata-hook table.
    ///
    /// Only the top-level keys are normalized; extra names inside
    /// `optional-dependencies` are data and kept verbatim.
    pub fn validate(table: &toml::Table) -> Result<Self> {
        let normalized = normalize_keys(table)?;
        toml::Value::Table(normalized)
            .try_into()
            .map_err(|e: toml::de::Error| DynamicVersioningError::validation(e.to_string()))
    }
}

/// Canonicalize the top-level keys of a table to underscored form.
///
/// A single stable pass: each hyphenated key is rewritten, and a collision
/// with an already-present key raises instead of silently picking a winner.
fn normalize_keys(table: &toml::Table) -> Result<toml::Table> {
    let mut out = toml::Table::new();
    for (key, value) in table {
        let normalized = key.replace('-', "_");
        if out.insert(normalized.clone(), value.clone()).is_some() {
            return Err(DynamicVersioningError::validation(format!(
                "key '{normalized}' is supplied in both hyphenated and underscored form"
            )));
        }
    }
    Ok(out)
}
