//! The version source adapter.

use std::cell::OnceCell;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::config::{Project, UvDynamicVersioning};
use crate::core::{EnvSnapshot, Result};
use crate::git::GitReader;
use crate::resolver::{Resolution, resolve};

/// The payload handed to the host packaging tool.
#[derive(Debug, Clone, Serialize)]
pub struct VersionData {
    /// The resolved version string.
    pub version: String,
}

/// Exposes the resolved version to the host packaging tool.
///
/// The project document is parsed and validated once per adapter instance;
/// the memoized value lives exactly as long as the adapter and is never
/// shared across process invocations.
#[derive(Debug)]
pub struct VersionSource {
    root: PathBuf,
    project: OnceCell<Project>,
}

impl VersionSource {
    /// An adapter for the project under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            project: OnceCell::new(),
        }
    }

    /// The validated project document, parsed on first use.
    pub fn project(&self) -> Result<&Project> {
        if let Some(project) = self.project.get() {
            return Ok(project);
        }
        let project = super::read_project(&self.root)?;
        debug!(root = %self.root.display(), "parsed project document");
        Ok(self.project.get_or_init(|| project))
    }

    /// The plugin configuration, defaulted when the table is absent.
    pub fn config(&self) -> Result<UvDynamicVersioning> {
        Ok(self.project()?.config())
    }

    /// Resolve the version against the current environment and the git
    /// repository at the project root.
    pub fn resolve(&self) -> Result<Resolution> {
        let config = self.config()?;
        let reader = GitReader::new(&self.root);
        resolve(&self.root, &config, &EnvSnapshot::from_process(), &reader)
    }

    /// The version source contract: `{"version": <resolved>}`.
    pub fn get_version_data(&self) -> Result<VersionData> {
        let resolution = self.resolve()?;
        Ok(VersionData {
            version: resolution.serialized,
        })
    }
}
