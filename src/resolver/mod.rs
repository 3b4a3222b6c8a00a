//! Version resolution orchestration.
//!
//! [`resolve`] is the single entry point of the pipeline: it checks the
//! bypass variable, obtains a [`Version`] descriptor (environment, file, or
//! VCS query with fallback), applies the bump policy, renders the configured
//! format, and validates the style constraint.
//!
//! # Resolution Order
//!
//! 1. `UV_DYNAMIC_VERSIONING_BYPASS` set to a non-empty value - the value is
//!    used verbatim and parsed structurally; bump, format and style rules do
//!    not apply on this path. An empty value behaves exactly like unset.
//! 2. `from-file` configured - the version is read from the named file
//!    (optionally extracted with a regex) and flows through the normal bump
//!    and formatting steps with zero distance and no VCS metadata.
//! 3. Otherwise the VCS is queried. A failed query is substituted with
//!    `fallback-version` when configured, else propagated as a VCS error.
//!
//! # Bump Gating
//!
//! The two formatting paths gate bumping differently, preserving the
//! reference tool's behavior:
//!
//! - `format-jinja`: bump only when enabled *and* `distance > 0`
//! - plain/default serialization: bump whenever enabled
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use uv_dynamic_versioning::config::UvDynamicVersioning;
//! use uv_dynamic_versioning::core::EnvSnapshot;
//! use uv_dynamic_versioning::git::GitReader;
//! use uv_dynamic_versioning::resolver::resolve;
//!
//! # fn example() -> anyhow::Result<()> {
//! let root = Path::new(".");
//! let config = UvDynamicVersioning::default();
//! let reader = GitReader::new(root);
//! let resolution = resolve(root, &config, &EnvSnapshot::from_process(), &reader)?;
//! println!("{}", resolution.serialized);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::config::{FromFile, UvDynamicVersioning};
use crate::core::{DynamicVersioningError, EnvSnapshot, Result};
use crate::git::{QueryOptions, VcsReader};
use crate::templating::render_template;
use crate::version::{SerializeOptions, Version, check_style};

/// The outcome of a resolution: the rendered string and the post-bump
/// structured descriptor it was rendered from.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The final version string.
    pub serialized: String,
    /// The descriptor after bump policy was applied.
    pub version: Version,
}

/// Resolve the project version.
///
/// `env` is an immutable snapshot taken by the caller; the resolver never
/// reads ambient process state. `reader` supplies VCS-derived version
/// information and is only consulted when neither the bypass variable nor
/// `from-file` short-circuits the query.
pub fn resolve(
    root: &Path,
    config: &UvDynamicVersioning,
    env: &EnvSnapshot,
    reader: &dyn VcsReader,
) -> Result<Resolution> {
    if let Some(bypassed) = env.bypass_version() {
        debug!(version = bypassed, "using bypassed version");
        return Ok(Resolution {
            serialized: bypassed.to_string(),
            version: Version::parse(bypassed),
        });
    }

    let version = match &config.from_file {
        Some(from_file) => read_from_file(root, from_file)?,
        None => query_vcs(config, reader)?,
    };
    debug!(base = %version.base, distance = version.distance, "resolved descriptor");

    if let Some(template) = &config.format_jinja {
        // Bump is distance-gated on this path only.
        let updated = if config.bump.enable && version.distance > 0 {
            version.bump(config.bump.index)?
        } else {
            version
        };
        let serialized =
            render_template(template, &updated, env, config.escape_with.as_deref())?;
        if let Some(style) = config.style {
            check_style(&serialized, style)?;
        }
        Ok(Resolution {
            serialized,
            version: updated,
        })
    } else {
        let updated = if config.bump.enable {
            version.bump(config.bump.index)?
        } else {
            version
        };
        let serialized = updated.serialize(&SerializeOptions {
            metadata: config.metadata,
            dirty: config.dirty,
            tagged_metadata: config.tagged_metadata,
            format: config.format.clone(),
            style: config.style,
        })?;
        Ok(Resolution {
            serialized,
            version: updated,
        })
    }
}

/// Query the VCS, substituting the fallback version on failure when one is
/// configured. Only VCS errors are absorbed; everything else propagates.
fn query_vcs(config: &UvDynamicVersioning, reader: &dyn VcsReader) -> Result<Version> {
    match reader.query(&QueryOptions::from_config(config)) {
        Ok(version) => Ok(version),
        Err(DynamicVersioningError::Vcs { operation, reason }) => {
            if let Some(fallback) = &config.fallback_version {
                debug!(fallback = %fallback, "VCS query failed, using fallback version");
                Ok(Version::parse(fallback))
            } else {
                Err(DynamicVersioningError::Vcs { operation, reason })
            }
        }
        Err(other) => Err(other),
    }
}

/// Read a version from a file, optionally extracting it with a regex whose
/// first capture group holds the version.
fn read_from_file(root: &Path, from_file: &FromFile) -> Result<Version> {
    let path = root.join(&from_file.source);
    let content = std::fs::read_to_string(&path)?;

    let raw = match &from_file.pattern {
        Some(pattern) => {
            let regex = Regex::new(pattern).map_err(|e| {
                DynamicVersioningError::validation(format!(
                    "from-file pattern is not a valid regex: {e}"
                ))
            })?;
            regex
                .captures(&content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| DynamicVersioningError::VersionParse {
                    input: format!("{} (pattern '{pattern}' did not match)", path.display()),
                })?
        }
        None => content.trim().to_string(),
    };

    Ok(Version::parse(&raw))
}
