//! uv-dynamic-versioning CLI entry point
//!
//! Parses arguments, installs the tracing subscriber, resolves the project
//! version and prints it. Failures are shown as user-friendly error reports
//! and exit with a non-zero status.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uv_dynamic_versioning::cli::Cli;
use uv_dynamic_versioning::core::user_friendly_error;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.execute() {
        let report = user_friendly_error(e);
        report.display();
        std::process::exit(1);
    }
}
