//! VCS querying: the `VcsReader` trait and the system-git implementation.
//!
//! The resolver only ever sees [`VcsReader`]: given matching rules
//! ([`QueryOptions`]), return a structured [`Version`] descriptor. This
//! module also ships [`GitReader`], which answers that contract by shelling
//! out to the system `git` binary - the same approach Cargo takes, so
//! whatever authentication and configuration the user has set up just works
//! and no VCS library is bundled.
//!
//! # Tag Selection
//!
//! Tags reachable from `HEAD` (or from `tag-branch` when configured) are
//! matched against the configured [`Pattern`]. Among the matching tags the
//! one with the smallest commit distance wins, with ties broken by tag
//! creation date; `latest-tag = true` restricts the search to the most
//! recently created tag. When nothing matches, the query fails under
//! `strict = true` and otherwise degrades to a `0.0.0` base at full
//! distance.
//!
//! Other VCS kinds accepted by the configuration (`mercurial`, `darcs`, ...)
//! fail here at query time with a VCS error.

use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, trace};

use crate::config::{UvDynamicVersioning, Vcs};
use crate::core::{DynamicVersioningError, Result};
use crate::version::Version;

/// Body of the default tag grammar: `v1.2.3`, `v1.2.3-alpha1`, `v1.2.3+linux`.
const DEFAULT_PATTERN_BODY: &str = r"(?P<base>\d+(\.\d+)*)([-._]?(?P<stage>[a-zA-Z]+)[-._]?(?P<revision>\d+)?)?(\+(?P<tagged_metadata>.+))?$";

const SHORT_COMMIT_LENGTH: usize = 7;

/// Tag-matching grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `v`-prefixed tags (`v1.2.3`).
    Default,
    /// Same grammar with the `v` optional.
    DefaultUnprefixed,
    /// A custom regex; must contain a `base` named capture group.
    Custom(String),
}

impl Pattern {
    /// Interpret a configuration `pattern` value.
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        match value {
            "default" => Self::Default,
            "default-unprefixed" => Self::DefaultUnprefixed,
            custom => Self::Custom(custom.to_string()),
        }
    }

    /// Compile the grammar, anchoring an optional literal tag prefix in
    /// front of it.
    pub fn compile(&self, prefix: Option<&str>) -> Result<Regex> {
        let prefix = prefix.map(regex::escape).unwrap_or_default();
        let source = match self {
            Self::Default => format!("^{prefix}v{DEFAULT_PATTERN_BODY}"),
            Self::DefaultUnprefixed => format!("^{prefix}v?{DEFAULT_PATTERN_BODY}"),
            Self::Custom(custom) => {
                if !custom.contains("(?P<base>") {
                    return Err(DynamicVersioningError::validation(
                        "custom pattern must contain a 'base' named capture group",
                    ));
                }
                match custom.strip_prefix('^') {
                    Some(anchored) => format!("^{prefix}{anchored}"),
                    None => format!("{prefix}{custom}"),
                }
            }
        };
        Regex::new(&source).map_err(|e| {
            DynamicVersioningError::validation(format!("pattern is not a valid regex: {e}"))
        })
    }
}

/// Matching rules for a VCS query, derived from the validated configuration.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// VCS kind to query.
    pub vcs: Vcs,
    /// Tag grammar.
    pub pattern: Pattern,
    /// Literal prefix expected in front of the tag grammar.
    pub pattern_prefix: Option<String>,
    /// Consider only the most recently created tag.
    pub latest_tag: bool,
    /// Fail instead of degrading to `0.0.0` when no tag matches.
    pub strict: bool,
    /// Tag directory, for VCS kinds that scope tags to a directory.
    pub tag_dir: String,
    /// Branch to search for tags instead of `HEAD`.
    pub tag_branch: Option<String>,
    /// Report the full commit id instead of the short form.
    pub full_commit: bool,
    /// Ignore untracked files when deciding dirtiness.
    pub ignore_untracked: bool,
    /// Truncate the commit id to this many characters.
    pub commit_length: Option<u32>,
    /// Prefix prepended to the commit id.
    pub commit_prefix: Option<String>,
}

impl QueryOptions {
    /// Derive query options from a validated configuration.
    #[must_use]
    pub fn from_config(config: &UvDynamicVersioning) -> Self {
        Self {
            vcs: config.vcs,
            pattern: Pattern::from_config_value(&config.pattern),
            pattern_prefix: config.pattern_prefix.clone(),
            latest_tag: config.latest_tag,
            strict: config.strict,
            tag_dir: config.tag_dir.clone(),
            tag_branch: config.tag_branch.clone(),
            full_commit: config.full_commit,
            ignore_untracked: config.ignore_untracked,
            commit_length: config.commit_length,
            commit_prefix: config.commit_prefix.clone(),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from_config(&UvDynamicVersioning::default())
    }
}

/// "Given a repository path and matching rules, return a structured version
/// descriptor." The resolver depends on nothing below this trait.
pub trait VcsReader {
    /// Query the VCS for version information.
    fn query(&self, options: &QueryOptions) -> Result<Version>;
}

/// System-git-backed [`VcsReader`].
#[derive(Debug, Clone)]
pub struct GitReader {
    root: PathBuf,
}

impl GitReader {
    /// A reader for the repository at (or above) `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run a git subcommand in the repository, returning trimmed stdout.
    fn git(&self, operation: &str, args: &[&str]) -> Result<String> {
        trace!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| {
                DynamicVersioningError::vcs(
                    operation,
                    format!("failed to run git: {e}"),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DynamicVersioningError::vcs(
                operation,
                stderr.trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn commit_id(&self, options: &QueryOptions) -> Result<String> {
        let full = self.git("rev-parse", &["rev-parse", "HEAD"])?;
        let mut commit = if let Some(length) = options.commit_length {
            full.chars().take(length as usize).collect()
        } else if options.full_commit {
            full
        } else {
            full.chars().take(SHORT_COMMIT_LENGTH).collect()
        };
        if let Some(prefix) = &options.commit_prefix {
            commit = format!("{prefix}{commit}");
        }
        Ok(commit)
    }

    fn branch(&self) -> Result<Option<String>> {
        let name = self.git("rev-parse", &["rev-parse", "--abbrev-ref", "HEAD"])?;
        // Detached HEAD reports the literal name "HEAD".
        Ok((name != "HEAD").then_some(name))
    }

    fn dirty(&self, options: &QueryOptions) -> Result<bool> {
        let mut args = vec!["status", "--porcelain"];
        if options.ignore_untracked {
            args.push("--untracked-files=no");
        }
        Ok(!self.git("status", &args)?.is_empty())
    }

    fn timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.git("log", &["log", "-1", "--format=%cI"])?;
        Ok(DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc)))
    }

    /// Tags reachable from the search head, most recently created first.
    fn tags(&self, options: &QueryOptions) -> Result<Vec<String>> {
        let merged = options.tag_branch.as_deref().unwrap_or("HEAD");
        let output = self.git(
            "tag",
            &["tag", "--merged", merged, "--sort=-creatordate"],
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn distance_from(&self, tag: &str) -> Result<u64> {
        let range = format!("{tag}..HEAD");
        let count = self.git("rev-list", &["rev-list", "--count", &range])?;
        count.parse().map_err(|_| {
            DynamicVersioningError::vcs("rev-list", format!("unexpected count '{count}'"))
        })
    }

    fn full_distance(&self) -> Result<u64> {
        let count = self.git("rev-list", &["rev-list", "--count", "HEAD"])?;
        count.parse().map_err(|_| {
            DynamicVersioningError::vcs("rev-list", format!("unexpected count '{count}'"))
        })
    }
}

/// A tag that matched the configured grammar, with its parsed parts.
struct MatchedTag {
    base: String,
    stage: Option<String>,
    revision: Option<u64>,
    tagged_metadata: Option<String>,
    distance: u64,
}

impl VcsReader for GitReader {
    fn query(&self, options: &QueryOptions) -> Result<Version> {
        match options.vcs {
            Vcs::Any | Vcs::Git => {}
            other => {
                return Err(DynamicVersioningError::vcs(
                    "query",
                    format!("VCS kind '{other}' is not supported by this build"),
                ));
            }
        }

        let commit = self.commit_id(options)?;
        let branch = self.branch()?;
        let dirty = self.dirty(options)?;
        let timestamp = self.timestamp()?;

        let pattern = options.pattern.compile(options.pattern_prefix.as_deref())?;
        let tags = self.tags(options)?;
        let candidates: Vec<&String> = if options.latest_tag {
            tags.iter().take(1).collect()
        } else {
            tags.iter().collect()
        };

        // Among matching tags the nearest one wins; the creatordate ordering
        // of `candidates` breaks distance ties in favor of newer tags.
        let mut nearest: Option<MatchedTag> = None;
        for tag in candidates {
            let Some(caps) = pattern.captures(tag) else {
                continue;
            };
            let distance = self.distance_from(tag)?;
            trace!(%tag, distance, "tag matched pattern");
            let closer = nearest
                .as_ref()
                .is_none_or(|current| distance < current.distance);
            if closer {
                nearest = Some(MatchedTag {
                    base: caps["base"].to_string(),
                    stage: caps.name("stage").map(|m| m.as_str().to_string()),
                    revision: caps
                        .name("revision")
                        .and_then(|m| m.as_str().parse().ok()),
                    tagged_metadata: caps
                        .name("tagged_metadata")
                        .map(|m| m.as_str().to_string()),
                    distance,
                });
            }
        }

        match nearest {
            Some(matched) => {
                debug!(
                    base = %matched.base,
                    distance = matched.distance,
                    "matched version tag"
                );
                Ok(Version {
                    base: matched.base,
                    stage: matched.stage,
                    revision: matched.revision,
                    distance: matched.distance,
                    commit: Some(commit),
                    dirty,
                    branch,
                    tagged_metadata: matched.tagged_metadata,
                    timestamp,
                })
            }
            None if options.strict => Err(DynamicVersioningError::vcs(
                "tag",
                "no tags match the configured pattern",
            )),
            None => {
                debug!("no matching tags, degrading to 0.0.0");
                Ok(Version {
                    distance: self.full_distance()?,
                    commit: Some(commit),
                    dirty,
                    branch,
                    timestamp,
                    ..Version::new("0.0.0")
                })
            }
        }
    }
}

/// Default grammar compiled without a prefix; used by tests and docs.
pub static DEFAULT_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Pattern::Default
        .compile(None)
        .expect("default tag pattern is a valid regex")
});
