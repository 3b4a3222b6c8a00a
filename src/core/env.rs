//! Immutable environment snapshots
//!
//! The resolver never reads the process environment directly. It takes an
//! [`EnvSnapshot`] captured once per resolution, which keeps resolution
//! deterministic and lets tests inject variables without mutating global
//! state.

use std::collections::BTreeMap;

/// Environment variable that bypasses VCS resolution entirely.
///
/// A non-empty value is used verbatim as the version; an empty value is
/// treated as unset.
pub const BYPASS_ENV: &str = "UV_DYNAMIC_VERSIONING_BYPASS";

/// An immutable key/value copy of the environment.
///
/// Captured once per resolution call. Mutating the process environment after
/// the snapshot has been taken has no effect on that resolution.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit key/value pairs. Intended for tests
    /// and embedding callers that control the environment themselves.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable. Returns `None` for unset variables; empty values
    /// are returned as-is (callers decide whether empty means unset).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The bypass version, if set to a non-empty string.
    #[must_use]
    pub fn bypass_version(&self) -> Option<&str> {
        self.get(BYPASS_ENV).filter(|v| !v.is_empty())
    }

    /// Iterate over all captured variables in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
