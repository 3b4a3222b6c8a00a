//! uv-dynamic-versioning - dynamic versions from VCS state
//!
//! A build-tool plugin that derives a package's version from version-control
//! state (tags, commit distance, dirty status) instead of a hardcoded string.
//! A packaging front-end consumes it as a *version source* and, optionally, a
//! *metadata hook* that renders dependency specifiers embedding the computed
//! version.
//!
//! # Architecture Overview
//!
//! The crate is split into a small synchronous core and thin adapters:
//!
//! - `pyproject.toml` carries the plugin configuration under
//!   `[tool.uv-dynamic-versioning]`
//! - the resolver turns configuration + VCS state into a version string
//! - adapters expose that string to the host packaging tool and the CLI
//!
//! ```text
//! pyproject.toml ──> config ──> resolver ──> templating ──> "1.2.3.post4.dev0+abc1234"
//!                                  │
//!                                  └──> git (VcsReader)
//! ```
//!
//! # Core Modules
//!
//! ## Resolution Pipeline
//! - [`config`] - Configuration parsing and validation (`[tool.uv-dynamic-versioning]`)
//! - [`version`] - Version descriptor: parsing, bumping, serialization, style grammars
//! - [`resolver`] - Orchestration: bypass, VCS query, bump policy, formatting
//! - [`templating`] - Tera template context and rendering (`format-jinja`)
//!
//! ## VCS Integration
//! - [`git`] - `VcsReader` trait and the system-git-backed implementation
//!
//! ## Host Integration
//! - [`plugin`] - Version source and metadata hook adapters
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and the environment snapshot
//!
//! # Configuration Format (pyproject.toml)
//!
//! ```toml
//! [tool.uv-dynamic-versioning]
//! vcs = "git"
//! style = "pep440"
//! bump = true
//! fallback-version = "0.0.0"
//!
//! [tool.uv-dynamic-versioning.metadata-hook]
//! dependencies = ["mypkg-core=={{ version }}"]
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Print the resolved version for the current directory
//! uv-dynamic-versioning
//!
//! # Resolve for another project root
//! uv-dynamic-versioning --root ../other-project
//! ```
//!
//! # Environment
//!
//! Setting `UV_DYNAMIC_VERSIONING_BYPASS` to a non-empty string skips VCS
//! resolution entirely and uses the given version verbatim. An empty value is
//! treated as unset.

// Resolution pipeline
pub mod config;
pub mod core;
pub mod resolver;
pub mod templating;
pub mod version;

// VCS integration
pub mod git;

// Host integration
pub mod cli;
pub mod plugin;
