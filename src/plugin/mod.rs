//! Host-facing plugin adapters.
//!
//! These are the thin layers a packaging front-end talks to:
//!
//! - [`VersionSource`] - the *version source* contract: resolve once per
//!   plugin instance and expose `get_version_data() -> {"version": ...}`
//! - [`MetadataHook`] - the *metadata hook* contract: render dependency
//!   templates with the resolved version and write them into the package
//!   metadata's `dependencies` / `optional-dependencies` fields
//!
//! Both read `pyproject.toml` from the caller-supplied root; the parsed
//! project is memoized for the adapter's lifetime and never shared across
//! process invocations.

mod metadata_hook;
mod version_source;

pub use metadata_hook::MetadataHook;
pub use version_source::{VersionData, VersionSource};

use std::path::Path;

use crate::config::Project;
use crate::core::Result;

/// Read and parse the raw project document under `root`.
pub fn read_document(root: &Path) -> Result<toml::Table> {
    let raw = std::fs::read_to_string(root.join("pyproject.toml"))?;
    Ok(toml::from_str(&raw)?)
}

/// Read and validate the project document under `root`.
pub fn read_project(root: &Path) -> Result<Project> {
    Project::validate(&read_document(root)?)
}

/// Look up a key accepting both underscored and hyphenated spellings.
pub(crate) fn table_get<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    table
        .get(key)
        .or_else(|| table.get(&key.replace('_', "-")))
}
