//! Template rendering for `format-jinja` expressions.
//!
//! This module provides Tera-based rendering of version templates, with a
//! fixed, documented context built from a resolved [`Version`]. The engine
//! is treated as a sandboxed collaborator: it sees exactly the bindings
//! below and nothing else - no filesystem, no process state beyond the
//! explicit `env` snapshot.
//!
//! # Template Context
//!
//! | Name | Value |
//! |---|---|
//! | `version` | default serialization of the descriptor |
//! | `base` | dotted numeric release segment |
//! | `stage` / `revision` | pre-release label and counter (null when absent) |
//! | `distance` | commits since the matched tag |
//! | `commit` | commit identifier (null when unknown) |
//! | `dirty` | whether the working tree has uncommitted changes |
//! | `branch` / `branch_escaped` | branch name, raw and restricted to `[A-Za-z0-9]` |
//! | `tagged_metadata` | metadata extracted from the tag |
//! | `timestamp` | commit time as `YYYYMMDDHHMMSS` |
//! | `major` / `minor` / `patch` | leading base components as integers |
//! | `env` | read-only environment snapshot |
//!
//! # Template Functions
//!
//! - `bump_version(base, index=-1)` - bump a dotted base
//! - `serialize_pep440(base, stage, revision, post, dev, metadata)`
//! - `serialize_pvp(base, metadata)`
//! - `serialize_semver(base, pre, metadata)`
//!
//! Tera functions take named arguments, so a custom pre-release rendering
//! looks like:
//!
//! ```text
//! {{ serialize_pep440(base=bump_version(base=base), stage=stage, revision=revision) }}
//! ```
//!
//! Unknown names and evaluation failures surface as
//! [`DynamicVersioningError::TemplateRender`].

use std::collections::HashMap;

use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use crate::core::{DynamicVersioningError, EnvSnapshot, Result};
use crate::version::{
    SerializeOptions, Version, base_part, bump_version, escape_branch, format_timestamp,
    serialize_pep440, serialize_pvp, serialize_semver,
};

/// The named values available to template expressions.
///
/// Pure with respect to its inputs: the only environment it exposes is the
/// snapshot it was given.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    context: TeraContext,
}

impl TemplateContext {
    /// Build the context for a resolved version.
    ///
    /// `escape_with` overrides the `branch_escaped` replacement (default:
    /// strip non-alphanumerics).
    pub fn from_version(
        version: &Version,
        env: &EnvSnapshot,
        escape_with: Option<&str>,
    ) -> Result<Self> {
        let mut context = TeraContext::new();

        context.insert("version", &version.serialize(&SerializeOptions::default())?);
        context.insert("base", &version.base);
        context.insert("stage", &version.stage);
        context.insert("revision", &version.revision);
        context.insert("distance", &version.distance);
        context.insert("commit", &version.commit);
        context.insert("dirty", &version.dirty);
        context.insert("branch", &version.branch);
        context.insert("tagged_metadata", &version.tagged_metadata);
        context.insert(
            "branch_escaped",
            &escape_branch(version.branch.as_deref(), escape_with),
        );
        context.insert("timestamp", &format_timestamp(version.timestamp.as_ref()));
        context.insert("major", &base_part(&version.base, 0));
        context.insert("minor", &base_part(&version.base, 1));
        context.insert("patch", &base_part(&version.base, 2));

        let env_map: HashMap<&str, &str> = env.iter().collect();
        context.insert("env", &env_map);

        Ok(Self { context })
    }
}

/// Render a template expression against a resolved version.
pub fn render_template(
    template: &str,
    version: &Version,
    env: &EnvSnapshot,
    escape_with: Option<&str>,
) -> Result<String> {
    let context = TemplateContext::from_version(version, env, escape_with)?;
    render_with_context(template, &context)
}

/// Render a template expression against an already-built context.
pub fn render_with_context(template: &str, context: &TemplateContext) -> Result<String> {
    let mut tera = Tera::default();
    register_functions(&mut tera);

    tera.add_raw_template("version", template)
        .map_err(|e| DynamicVersioningError::TemplateRender {
            reason: format_tera_error(&e),
        })?;

    tera.render("version", &context.context)
        .map_err(|e| DynamicVersioningError::TemplateRender {
            reason: format_tera_error(&e),
        })
}

fn register_functions(tera: &mut Tera) {
    tera.register_function("bump_version", bump_version_fn);
    tera.register_function("serialize_pep440", serialize_pep440_fn);
    tera.register_function("serialize_pvp", serialize_pvp_fn);
    tera.register_function("serialize_semver", serialize_semver_fn);
}

/// Flatten a tera error and its sources into one line; tera's top-level
/// message alone is usually just "Failed to render".
fn format_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn required_str(args: &HashMap<String, Value>, name: &str, function: &str) -> tera::Result<String> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(tera::Error::msg(format!(
            "{function}: argument '{name}' must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "{function}: missing required argument '{name}'"
        ))),
    }
}

fn optional_str(args: &HashMap<String, Value>, name: &str) -> Option<String> {
    match args.get(name) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn optional_int(args: &HashMap<String, Value>, name: &str) -> Option<u64> {
    args.get(name).and_then(Value::as_u64)
}

fn string_list(args: &HashMap<String, Value>, name: &str) -> Vec<String> {
    match args.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn bump_version_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let base = required_str(args, "base", "bump_version")?;
    let index = args.get("index").and_then(Value::as_i64).unwrap_or(-1);
    let bumped = bump_version(&base, index).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(Value::String(bumped))
}

fn serialize_pep440_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let base = required_str(args, "base", "serialize_pep440")?;
    let serialized = serialize_pep440(
        &base,
        optional_str(args, "stage").as_deref(),
        optional_int(args, "revision"),
        optional_int(args, "post"),
        optional_int(args, "dev"),
        &string_list(args, "metadata"),
    );
    Ok(Value::String(serialized))
}

fn serialize_pvp_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let base = required_str(args, "base", "serialize_pvp")?;
    Ok(Value::String(serialize_pvp(
        &base,
        &string_list(args, "metadata"),
    )))
}

fn serialize_semver_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let base = required_str(args, "base", "serialize_semver")?;
    Ok(Value::String(serialize_semver(
        &base,
        &string_list(args, "pre"),
        &string_list(args, "metadata"),
    )))
}
