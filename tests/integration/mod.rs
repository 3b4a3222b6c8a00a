//! Integration test suite for uv-dynamic-versioning
//!
//! End-to-end tests against real scratch git repositories and the compiled
//! binary. These need a system `git` on the PATH.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: scratch-project fixture shared by the suites
//! - **versioning**: resolution against real repositories (tags, distance,
//!   dirtiness, patterns, fallbacks, adapters)
//! - **cli**: the compiled binary's stdout/stderr/exit-code contract

mod common;

mod cli;
mod versioning;
