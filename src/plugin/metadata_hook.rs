//! The metadata hook adapter.
//!
//! Populates `project.dependencies` and `project.optional-dependencies`
//! with dependency specifiers rendered against the resolved version, e.g.
//! `"mypkg-core=={{ version }}"` → `"mypkg-core==1.2.3"`.
//!
//! The hook refuses to run when the metadata does not declare the target
//! fields dynamic, when a dynamic field already has a static value, or when
//! the hook configuration supplies no templates at all.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::config::MetadataHookConfig;
use crate::core::{DynamicVersioningError, EnvSnapshot, Result};
use crate::git::GitReader;
use crate::resolver::resolve;
use crate::templating::render_template;
use crate::version::Version;

/// Renders dependency templates with the resolved version and writes them
/// into the package metadata.
#[derive(Debug)]
pub struct MetadataHook {
    config: MetadataHookConfig,
    version: Version,
    env: EnvSnapshot,
    escape_with: Option<String>,
}

impl MetadataHook {
    /// A hook over an already-resolved version. Used by tests and embedding
    /// callers that ran the resolver themselves.
    #[must_use]
    pub fn new(config: MetadataHookConfig, version: Version, env: EnvSnapshot) -> Self {
        Self {
            config,
            version,
            env,
            escape_with: None,
        }
    }

    /// Build the hook for the project under `root`: read and validate the
    /// document, resolve the version, and pick up the hook configuration
    /// from `[tool.uv-dynamic-versioning.metadata-hook]`.
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let document = super::read_document(&root)?;
        let project = crate::config::Project::validate(&document)?;
        let plugin_config = project.config();

        let hook_config = hook_table(&document)?
            .map(MetadataHookConfig::validate)
            .transpose()?
            .unwrap_or_default();

        let env = EnvSnapshot::from_process();
        let reader = GitReader::new(&root);
        let resolution = resolve(&root, &plugin_config, &env, &reader)?;
        debug!(version = %resolution.serialized, "resolved version for metadata hook");

        Ok(Self {
            config: hook_config,
            version: resolution.version,
            env,
            escape_with: plugin_config.escape_with,
        })
    }

    /// Rendered `dependencies`, or `None` when not configured.
    pub fn render_dependencies(&self) -> Result<Option<Vec<String>>> {
        self.config
            .dependencies
            .as_ref()
            .map(|deps| self.render_all(deps))
            .transpose()
    }

    /// Rendered `optional-dependencies`, or `None` when not configured.
    pub fn render_optional_dependencies(
        &self,
    ) -> Result<Option<BTreeMap<String, Vec<String>>>> {
        let Some(groups) = &self.config.optional_dependencies else {
            return Ok(None);
        };
        let mut rendered = BTreeMap::new();
        for (extra, deps) in groups {
            rendered.insert(extra.clone(), self.render_all(deps)?);
        }
        Ok(Some(rendered))
    }

    /// The metadata hook contract: mutate `dependencies` /
    /// `optional-dependencies` in place.
    pub fn update(&self, metadata: &mut toml::Table) -> Result<()> {
        let dynamic = dynamic_fields(metadata)?;
        let dynamic_dependencies = dynamic.iter().any(|f| f == "dependencies");
        let dynamic_optional = dynamic.iter().any(|f| f == "optional-dependencies");
        if !(dynamic_dependencies || dynamic_optional) {
            return Err(DynamicVersioningError::MetadataConflict {
                reason: "'dependencies' or 'optional-dependencies' must be listed in \
                         'project.dynamic' to use this hook"
                    .to_string(),
            });
        }

        if dynamic_dependencies && metadata.contains_key("dependencies") {
            return Err(DynamicVersioningError::MetadataConflict {
                reason: "'dependencies' is dynamic but already listed in [project]".to_string(),
            });
        }
        if dynamic_optional && metadata.contains_key("optional-dependencies") {
            return Err(DynamicVersioningError::MetadataConflict {
                reason: "'optional-dependencies' is dynamic but already listed in [project]"
                    .to_string(),
            });
        }

        if self.config.dependencies.is_none() && self.config.optional_dependencies.is_none() {
            return Err(DynamicVersioningError::MetadataConflict {
                reason: "no dependencies or optional-dependencies found in the hook \
                         configuration"
                    .to_string(),
            });
        }

        if let Some(dependencies) = self.render_dependencies()? {
            if !dependencies.is_empty() {
                metadata.insert(
                    "dependencies".to_string(),
                    toml::Value::Array(
                        dependencies.into_iter().map(toml::Value::String).collect(),
                    ),
                );
            }
        }

        if let Some(groups) = self.render_optional_dependencies()? {
            if !groups.is_empty() {
                let mut table = toml::Table::new();
                for (extra, deps) in groups {
                    table.insert(
                        extra,
                        toml::Value::Array(
                            deps.into_iter().map(toml::Value::String).collect(),
                        ),
                    );
                }
                metadata.insert(
                    "optional-dependencies".to_string(),
                    toml::Value::Table(table),
                );
            }
        }

        Ok(())
    }

    fn render_all(&self, templates: &[String]) -> Result<Vec<String>> {
        templates
            .iter()
            .map(|t| render_template(t, &self.version, &self.env, self.escape_with.as_deref()))
            .collect()
    }
}

/// The `project.dynamic` list; absent means empty, any other shape raises.
fn dynamic_fields(metadata: &toml::Table) -> Result<Vec<String>> {
    match metadata.get("dynamic") {
        None => Ok(Vec::new()),
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    DynamicVersioningError::MetadataConflict {
                        reason: "'dynamic' must be an array of field names".to_string(),
                    }
                })
            })
            .collect(),
        Some(_) => Err(DynamicVersioningError::MetadataConflict {
            reason: "'dynamic' must be an array of field names".to_string(),
        }),
    }
}

/// Navigate to `[tool.uv-dynamic-versioning.metadata-hook]`, accepting both
/// key spellings at each level.
fn hook_table(document: &toml::Table) -> Result<Option<&toml::Table>> {
    let Some(tool) = document.get("tool").and_then(toml::Value::as_table) else {
        return Ok(None);
    };
    let Some(plugin) =
        super::table_get(tool, "uv_dynamic_versioning").and_then(toml::Value::as_table)
    else {
        return Ok(None);
    };
    match super::table_get(plugin, "metadata_hook") {
        None => Ok(None),
        Some(toml::Value::Table(table)) => Ok(Some(table)),
        Some(_) => Err(DynamicVersioningError::validation(
            "metadata-hook must be a table",
        )),
    }
}
