//! Version descriptor: parsing, bumping, serialization, and style grammars.
//!
//! This module owns the structured representation of a VCS-derived version
//! and every rule for turning it back into a string:
//!
//! - [`Version`] - the descriptor produced by a VCS query (base, pre-release
//!   stage/revision, commit distance, commit id, dirty flag, branch, tagged
//!   metadata, timestamp)
//! - [`Version::serialize`] - default serialization driven by
//!   [`SerializeOptions`] (style, metadata flags, plain `format` templates)
//! - [`Version::bump`] / [`bump_version`] - bump policy
//! - [`serialize_pep440`] / [`serialize_semver`] / [`serialize_pvp`] - the
//!   three style serializers, also exposed to `format-jinja` templates
//! - [`check_style`] - grammar validation for rendered strings
//!
//! # Styles
//!
//! Three named grammars are supported:
//!
//! | Style | Example at distance 3 |
//! |---|---|
//! | `pep440` (default) | `1.2.3.post3.dev0+a1b2c3d` |
//! | `semver` | `1.2.3-pre.3+a1b2c3d` |
//! | `pvp` | `1.2.3-3-a1b2c3d` |
//!
//! The Semantic Versioning grammar is delegated to the `semver` crate, whose
//! strict parser already rejects zero-padded numeric identifiers.
//!
//! # Examples
//!
//! ```rust
//! use uv_dynamic_versioning::version::{SerializeOptions, Version};
//!
//! let version = Version::from_tag_parts("1.0.0", Some("alpha"), Some(1));
//! assert_eq!(version.serialize(&SerializeOptions::default()).unwrap(), "1.0.0a1");
//!
//! let parsed = Version::parse("v1.2.3");
//! assert_eq!(parsed.base, "1.2.3");
//! ```

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{DynamicVersioningError, Result};

/// Lenient version-string grammar used for bypass and fallback values.
///
/// Mirrors the default tag grammar minus the mandatory prefix: an optional
/// `v`, a dotted numeric base, an optional stage with optional revision, and
/// optional `+metadata`.
static VERSION_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        v?
        (?P<base>\d+(\.\d+)*)
        ([-._]?(?P<stage>[a-zA-Z]+)[-._]?(?P<revision>\d+)?)?
        (\+(?P<tagged_metadata>.+))?
        $",
    )
    .expect("version grammar is a valid regex")
});

/// PEP 440 grammar: `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`.
static PEP440_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        (\d+!)?
        \d+(\.\d+)*
        ((a|b|rc)\d+)?
        (\.post\d+)?
        (\.dev\d+)?
        (\+[a-zA-Z0-9]+(\.[a-zA-Z0-9]+)*)?
        $",
    )
    .expect("PEP 440 grammar is a valid regex")
});

/// PVP grammar: dotted numeric base plus dash-separated alphanumeric tags.
static PVP_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)*(-[a-zA-Z0-9]+)*$").expect("PVP grammar is a valid regex")
});

/// A named version-string grammar that rendered output must conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// PEP 440 (`1.2.3a1.post4.dev0+local`)
    Pep440,
    /// Semantic Versioning 2.0.0 (`1.2.3-alpha.1+build`)
    Semver,
    /// Haskell PVP (`1.2.3-alpha-1`)
    Pvp,
}

impl Style {
    /// Human-readable style name used in error messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pep440 => "PEP 440",
            Self::Semver => "Semantic Versioning",
            Self::Pvp => "PVP",
        }
    }
}

/// Structured version information derived from VCS state.
///
/// Invariants: a set `revision` implies a set `stage`; `distance == 0`
/// together with `dirty == false` means the working tree sits exactly at a
/// clean tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Dotted numeric release segment, e.g. `"1.0.0"`.
    pub base: String,
    /// Pre-release label (e.g. `"alpha"`), if any.
    pub stage: Option<String>,
    /// Pre-release counter, only meaningful with a stage.
    pub revision: Option<u64>,
    /// Commits since the matched tag; 0 means exactly at a tag.
    pub distance: u64,
    /// Commit identifier, if known.
    pub commit: Option<String>,
    /// Whether uncommitted changes are present.
    pub dirty: bool,
    /// Branch name, if known.
    pub branch: Option<String>,
    /// Free-form metadata extracted from the tag (after `+`).
    pub tagged_metadata: Option<String>,
    /// Commit timestamp, if known.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Version {
    /// A bare version with the given base and no VCS metadata.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            stage: None,
            revision: None,
            distance: 0,
            commit: None,
            dirty: false,
            branch: None,
            tagged_metadata: None,
            timestamp: None,
        }
    }

    /// A version assembled from already-split tag parts. Used by VCS readers
    /// and tests.
    #[must_use]
    pub fn from_tag_parts(
        base: impl Into<String>,
        stage: Option<&str>,
        revision: Option<u64>,
    ) -> Self {
        Self {
            stage: stage.map(str::to_string),
            revision,
            ..Self::new(base)
        }
    }

    /// Parse a version string into its components.
    ///
    /// Accepts an optional `v` prefix, a dotted numeric base, an optional
    /// stage and revision, and optional `+metadata`. Input that does not
    /// match the grammar is kept verbatim as the base, so parsing never
    /// fails; bypass and fallback values are honored as given.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match VERSION_GRAMMAR.captures(input) {
            Some(caps) => Self {
                base: caps["base"].to_string(),
                stage: caps.name("stage").map(|m| m.as_str().to_string()),
                revision: caps
                    .name("revision")
                    .and_then(|m| m.as_str().parse().ok()),
                tagged_metadata: caps
                    .name("tagged_metadata")
                    .map(|m| m.as_str().to_string()),
                ..Self::new("")
            },
            None => Self::new(input),
        }
    }

    /// Increment the version.
    ///
    /// When a pre-release stage is present the revision is bumped instead of
    /// the base (a missing revision is assumed to be 1, so it becomes 2).
    /// Otherwise the numeric base component at `index` is incremented;
    /// negative indices count from the end and no other component is reset.
    pub fn bump(&self, index: i64) -> Result<Self> {
        let mut bumped = self.clone();
        if bumped.stage.is_some() {
            bumped.revision = Some(bumped.revision.unwrap_or(1) + 1);
        } else {
            bumped.base = bump_version(&bumped.base, index)?;
        }
        Ok(bumped)
    }

    /// Serialize with the default structured rules.
    ///
    /// A plain `format` template overrides the default shape; a configured
    /// `style` still validates the final output either way.
    pub fn serialize(&self, opts: &SerializeOptions) -> Result<String> {
        if let Some(format) = &opts.format {
            let out = self.format_with(format)?;
            if let Some(style) = opts.style {
                check_style(&out, style)?;
            }
            return Ok(out);
        }

        let style = opts.style.unwrap_or(Style::Pep440);

        let mut meta_parts: Vec<String> = Vec::new();
        if opts.metadata != Some(false) {
            let include_commit = opts.metadata == Some(true)
                || (opts.metadata.is_none() && self.distance > 0);
            if include_commit {
                if let Some(commit) = &self.commit {
                    meta_parts.push(commit.clone());
                }
            }
            if opts.dirty && self.dirty {
                meta_parts.push("dirty".to_string());
            }
            if opts.tagged_metadata {
                if let Some(tagged) = &self.tagged_metadata {
                    meta_parts.push(tagged.clone());
                }
            }
        }

        let out = match style {
            Style::Pep440 => {
                let (post, dev) = if self.distance > 0 {
                    (Some(self.distance), Some(0))
                } else {
                    (None, None)
                };
                serialize_pep440(
                    &self.base,
                    self.stage.as_deref(),
                    self.revision,
                    post,
                    dev,
                    &meta_parts,
                )
            }
            Style::Semver => {
                let mut pre_parts: Vec<String> = Vec::new();
                if let Some(stage) = &self.stage {
                    pre_parts.push(stage.clone());
                    if let Some(revision) = self.revision {
                        pre_parts.push(revision.to_string());
                    }
                }
                if self.distance > 0 {
                    pre_parts.push("pre".to_string());
                    pre_parts.push(self.distance.to_string());
                }
                serialize_semver(&self.base, &pre_parts, &meta_parts)
            }
            Style::Pvp => {
                let mut parts: Vec<String> = Vec::new();
                if let Some(stage) = &self.stage {
                    parts.push(stage.clone());
                    if let Some(revision) = self.revision {
                        parts.push(revision.to_string());
                    }
                }
                if self.distance > 0 {
                    parts.push(self.distance.to_string());
                }
                parts.extend(meta_parts);
                serialize_pvp(&self.base, &parts)
            }
        };

        if opts.style.is_some() {
            check_style(&out, style)?;
        }
        Ok(out)
    }

    /// Substitute `{placeholder}` fields in a plain format template.
    ///
    /// `{{` and `}}` are literal braces. Unknown placeholders raise a
    /// validation error rather than rendering partially.
    fn format_with(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => {
                                return Err(DynamicVersioningError::validation(format!(
                                    "format has an unterminated placeholder: '{template}'"
                                )));
                            }
                        }
                    }
                    out.push_str(&self.placeholder(&name)?);
                }
                _ => out.push(c),
            }
        }
        Ok(out)
    }

    fn placeholder(&self, name: &str) -> Result<String> {
        let value = match name {
            "base" => self.base.clone(),
            "stage" => self.stage.clone().unwrap_or_default(),
            "revision" => self.revision.map(|r| r.to_string()).unwrap_or_default(),
            "distance" => self.distance.to_string(),
            "commit" => self.commit.clone().unwrap_or_default(),
            "dirty" => if self.dirty { "dirty" } else { "clean" }.to_string(),
            "tagged_metadata" => self.tagged_metadata.clone().unwrap_or_default(),
            "branch" => self.branch.clone().unwrap_or_default(),
            "branch_escaped" => escape_branch(self.branch.as_deref(), None).unwrap_or_default(),
            "timestamp" => format_timestamp(self.timestamp.as_ref()).unwrap_or_default(),
            "major" => base_part(&self.base, 0).to_string(),
            "minor" => base_part(&self.base, 1).to_string(),
            "patch" => base_part(&self.base, 2).to_string(),
            _ => {
                return Err(DynamicVersioningError::validation(format!(
                    "format contains invalid placeholder '{{{name}}}'"
                )));
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Version {
    /// Default serialization (PEP 440, commit metadata only at distance).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serialized = self
            .serialize(&SerializeOptions::default())
            .map_err(|_| fmt::Error)?;
        write!(f, "{serialized}")
    }
}

/// Options driving [`Version::serialize`]. Mirrors the configuration fields
/// `metadata`, `style`, `dirty`, `tagged-metadata` and `format`.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// `Some(true)` always includes the commit id, `Some(false)` suppresses
    /// all metadata, `None` includes the commit id only at distance > 0.
    pub metadata: Option<bool>,
    /// Append a `dirty` metadata part when the working tree is dirty.
    pub dirty: bool,
    /// Append tag-extracted metadata.
    pub tagged_metadata: bool,
    /// Plain placeholder template overriding the default shape.
    pub format: Option<String>,
    /// Style constraint (and default-shape selector).
    pub style: Option<Style>,
}

/// Increment the numeric component of a dotted base at `index`.
///
/// Negative indices count from the end; no other component is reset.
///
/// ```rust
/// use uv_dynamic_versioning::version::bump_version;
///
/// assert_eq!(bump_version("1.2.3", -1).unwrap(), "1.2.4");
/// assert_eq!(bump_version("1.2.3", 0).unwrap(), "2.2.3");
/// ```
pub fn bump_version(base: &str, index: i64) -> Result<String> {
    let mut parts: Vec<u64> = Vec::new();
    for part in base.split('.') {
        parts.push(part.parse().map_err(|_| {
            DynamicVersioningError::validation(format!(
                "cannot bump non-numeric version component '{part}' in '{base}'"
            ))
        })?);
    }

    let len = parts.len() as i64;
    let resolved = if index < 0 { len + index } else { index };
    if resolved < 0 || resolved >= len {
        return Err(DynamicVersioningError::validation(format!(
            "bump index {index} is out of range for base '{base}'"
        )));
    }

    parts[resolved as usize] += 1;
    Ok(parts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

/// Serialize version parts in the PEP 440 style.
///
/// Stage labels are normalized to the canonical PEP 440 spellings
/// (`alpha` → `a`, `beta` → `b`, `c`/`pre`/`preview` → `rc`). A stage
/// without a revision gets revision 0, since PEP 440 does not allow
/// omitting it.
#[must_use]
pub fn serialize_pep440(
    base: &str,
    stage: Option<&str>,
    revision: Option<u64>,
    post: Option<u64>,
    dev: Option<u64>,
    metadata: &[String],
) -> String {
    let mut out = base.to_string();

    if let Some(stage) = stage {
        let lower = stage.to_lowercase();
        let normalized = match lower.as_str() {
            "alpha" => "a",
            "beta" => "b",
            "c" | "pre" | "preview" => "rc",
            other => other,
        };
        out.push_str(normalized);
        out.push_str(&revision.unwrap_or(0).to_string());
    }

    if let Some(post) = post {
        out.push_str(&format!(".post{post}"));
    }
    if let Some(dev) = dev {
        out.push_str(&format!(".dev{dev}"));
    }
    if !metadata.is_empty() {
        out.push('+');
        out.push_str(&metadata.join("."));
    }

    out
}

/// Serialize version parts in the Semantic Versioning style.
#[must_use]
pub fn serialize_semver(base: &str, pre: &[String], metadata: &[String]) -> String {
    let mut out = base.to_string();
    if !pre.is_empty() {
        out.push('-');
        out.push_str(&pre.join("."));
    }
    if !metadata.is_empty() {
        out.push('+');
        out.push_str(&metadata.join("."));
    }
    out
}

/// Serialize version parts in the Haskell PVP style (dash-joined).
#[must_use]
pub fn serialize_pvp(base: &str, metadata: &[String]) -> String {
    let mut parts = vec![base.to_string()];
    parts.extend_from_slice(metadata);
    parts.join("-")
}

/// Validate a rendered version string against a style grammar.
///
/// The Semantic Versioning check is delegated to the `semver` crate, which
/// also rejects zero-padded numeric components (e.g. a `-01` pre-release
/// part).
pub fn check_style(version: &str, style: Style) -> Result<()> {
    let valid = match style {
        Style::Pep440 => PEP440_GRAMMAR.is_match(version),
        Style::Semver => semver::Version::parse(version).is_ok(),
        Style::Pvp => PVP_GRAMMAR.is_match(version),
    };

    if valid {
        Ok(())
    } else {
        Err(DynamicVersioningError::StyleViolation {
            version: version.to_string(),
            style: style.display_name().to_string(),
        })
    }
}

/// Strip (or replace) every character outside `[A-Za-z0-9]` in a branch
/// name. An absent branch stays absent, never an empty string.
#[must_use]
pub fn escape_branch(branch: Option<&str>, replace_with: Option<&str>) -> Option<String> {
    static NON_ALNUM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("escape grammar is a valid regex"));
    branch.map(|b| {
        NON_ALNUM
            .replace_all(b, replace_with.unwrap_or(""))
            .into_owned()
    })
}

/// Format a timestamp as `YYYYMMDDHHMMSS`; absent stays absent.
#[must_use]
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> Option<String> {
    timestamp.map(|t| t.format("%Y%m%d%H%M%S").to_string())
}

/// The dot-separated component of a base at `index`, parsed as an integer.
/// Missing or non-numeric components yield 0, never an error.
#[must_use]
pub fn base_part(base: &str, index: usize) -> u64 {
    base.split('.')
        .nth(index)
        .and_then(|part| part.parse().ok())
        .unwrap_or(0)
}
