//! Error handling for uv-dynamic-versioning
//!
//! The error system is built around two types:
//! 1. [`DynamicVersioningError`] - enumerated error types for all failure cases
//! 2. [`ErrorReport`] - wrapper that adds user-friendly suggestions for CLI display
//!
//! # Error Categories
//!
//! - **Configuration**: [`DynamicVersioningError::Validation`] - bad shapes,
//!   wrong primitive types, unknown enum values, duplicate normalized keys
//! - **VCS**: [`DynamicVersioningError::Vcs`] - the underlying query failed
//!   and no fallback version was configured
//! - **Styles**: [`DynamicVersioningError::StyleViolation`] - a rendered
//!   version does not match the requested style grammar
//! - **Templates**: [`DynamicVersioningError::TemplateRender`] - a
//!   `format-jinja` expression referenced an unknown name or failed to
//!   evaluate
//! - **Metadata hook**: [`DynamicVersioningError::MetadataConflict`] -
//!   dynamic-vs-static field conflicts or missing hook configuration
//!
//! Standard library and ecosystem errors are converted automatically:
//! [`std::io::Error`] → [`DynamicVersioningError::Io`], [`toml::de::Error`] →
//! [`DynamicVersioningError::Toml`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use uv_dynamic_versioning::core::{DynamicVersioningError, user_friendly_error};
//!
//! fn resolve() -> anyhow::Result<String> {
//!     Err(DynamicVersioningError::Vcs {
//!         operation: "describe".to_string(),
//!         reason: "not a git repository".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = resolve() {
//!     let report = user_friendly_error(e);
//!     report.display();
//!     std::process::exit(1);
//! }
//! ```

use colored::Colorize;
use thiserror::Error;

/// Convenience alias used throughout the resolution pipeline.
pub type Result<T> = std::result::Result<T, DynamicVersioningError>;

/// The main error type for version resolution
///
/// Each variant represents a specific failure mode with enough context for
/// the host packaging tool to surface an actionable build failure. There is
/// no retry logic anywhere: VCS queries and template renders are
/// deterministic given their inputs, so retrying would not change the
/// outcome.
#[derive(Error, Debug)]
pub enum DynamicVersioningError {
    /// Configuration has an invalid shape, type, or enum value
    ///
    /// Raised while validating `[tool.uv-dynamic-versioning]`: an
    /// unrecognized VCS or style name, a boolean field given a string, a
    /// `bump` value that is neither a boolean nor a table, or the same key
    /// spelled both hyphenated and underscored.
    #[error("Invalid configuration: {reason}")]
    Validation {
        /// What was wrong with the configuration
        reason: String,
    },

    /// The VCS query failed and no fallback version was configured
    #[error("VCS query failed during {operation}: {reason}")]
    Vcs {
        /// The VCS operation that failed (e.g. "describe", "status")
        operation: String,
        /// The reason reported by the underlying VCS
        reason: String,
    },

    /// A rendered version string does not match the requested style grammar
    #[error("Version '{version}' does not conform to the {style} style")]
    StyleViolation {
        /// The rendered version string that failed validation
        version: String,
        /// Human-readable name of the style (e.g. "Semantic Versioning")
        style: String,
    },

    /// A `format-jinja` template failed to evaluate
    #[error("Template rendering failed: {reason}")]
    TemplateRender {
        /// The reason reported by the template engine
        reason: String,
    },

    /// Package metadata conflicts with the dynamic-dependency configuration
    #[error("Metadata conflict: {reason}")]
    MetadataConflict {
        /// Description of the conflicting or missing fields
        reason: String,
    },

    /// A version string could not be parsed
    #[error("Cannot parse version from '{input}'")]
    VersionParse {
        /// The input that failed to parse
        input: String,
    },

    /// I/O error from [`std::io::Error`]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error from [`toml::de::Error`]
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DynamicVersioningError {
    /// Shorthand for a [`DynamicVersioningError::Validation`] error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`DynamicVersioningError::Vcs`] error.
    pub fn vcs(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Vcs {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// User-friendly error wrapper for CLI display
///
/// Pairs an error message with an optional suggestion and details. The
/// suggestion is an actionable step (shown in green); details explain why
/// the error occurred (shown in yellow).
#[derive(Debug)]
pub struct ErrorReport {
    /// The underlying error message
    pub message: String,
    /// Optional actionable suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorReport {
    /// Create a report with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add explanatory details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the report to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(details) = &self.details {
            write!(f, "\ndetails: {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nsuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorReport`]
///
/// Known [`DynamicVersioningError`] variants get tailored suggestions;
/// everything else is reported verbatim with its source chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorReport {
    if let Some(err) = error.downcast_ref::<DynamicVersioningError>() {
        return report_for(err);
    }

    let mut report = ErrorReport::new(error.to_string());
    if let Some(source) = error.source() {
        report = report.with_details(source.to_string());
    }
    report
}

fn report_for(error: &DynamicVersioningError) -> ErrorReport {
    let report = ErrorReport::new(error.to_string());
    match error {
        DynamicVersioningError::Validation { .. } => report
            .with_suggestion(
                "Check the [tool.uv-dynamic-versioning] table in pyproject.toml",
            )
            .with_details(
                "Field names accept hyphenated or underscored spellings, but not both at once",
            ),
        DynamicVersioningError::Vcs { .. } => report
            .with_suggestion(
                "Run from inside a repository with at least one commit, or set fallback-version",
            )
            .with_details(
                "The version is derived from VCS tags; without a repository there is nothing to read",
            ),
        DynamicVersioningError::StyleViolation { .. } => report.with_suggestion(
            "Adjust format/format-jinja so the rendered version matches the configured style",
        ),
        DynamicVersioningError::TemplateRender { .. } => report.with_details(
            "Templates may reference base, stage, revision, distance, commit, dirty, branch, \
             branch_escaped, tagged_metadata, timestamp, major, minor, patch, env and version",
        ),
        DynamicVersioningError::MetadataConflict { .. } => report.with_suggestion(
            "Declare the field in project.dynamic and remove any static value for it",
        ),
        _ => report,
    }
}
