//! Core types for uv-dynamic-versioning
//!
//! This module is the foundation of the crate's type system:
//!
//! - [`error`] - the strongly-typed error taxonomy ([`DynamicVersioningError`])
//!   and the colored, suggestion-bearing [`ErrorReport`] shown by the CLI
//! - [`env`] - [`EnvSnapshot`], an immutable copy of the process environment
//!   taken once per resolution so the core never reads ambient state
//!
//! # Error Design
//!
//! Every failure mode has a dedicated variant so callers can match precisely:
//! configuration shape errors, VCS query failures, style-grammar violations,
//! template evaluation failures, and metadata-hook conflicts. Nothing is
//! recovered locally except the fallback-version substitution and the bypass
//! short-circuit handled by the resolver; everything else propagates to the
//! host as a build failure.

pub mod env;
pub mod error;

pub use env::EnvSnapshot;
pub use error::{DynamicVersioningError, ErrorReport, Result, user_friendly_error};
