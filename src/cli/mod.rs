//! Command-line interface.
//!
//! The CLI is a thin shell over the version source adapter: resolve the
//! project version and print it to stdout. Any raised failure is reported
//! through the user-friendly error display and exits non-zero.
//!
//! ```bash
//! # Resolve the current directory
//! uv-dynamic-versioning
//!
//! # Resolve another project root
//! uv-dynamic-versioning --root ../other-project
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::plugin::VersionSource;

/// Print the dynamically resolved project version.
#[derive(Debug, Parser)]
#[command(name = "uv-dynamic-versioning", version, about)]
pub struct Cli {
    /// Project root containing pyproject.toml
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve and print the version.
    pub fn execute(self) -> Result<()> {
        let source = VersionSource::new(&self.root);
        let data = source.get_version_data()?;
        println!("{}", data.version);
        Ok(())
    }
}
