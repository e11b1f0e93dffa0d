//! # Sidekick Command Implementation
//!
//! This module implements the `sidekick` subcommand, which migrates a Rust
//! repository configured through `.sidekick.toml` files. Hand-made settings
//! in an existing `librarian.yaml` at the repository root are carried over.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use librarian_migrate::config::Language;
use librarian_migrate::naming::GroupingPolicy;
use librarian_migrate::phases::orchestrator;
use librarian_migrate::sidekick::SidekickReader;

/// Migrate a Rust repository's .sidekick.toml files into librarian.yaml
#[derive(Args, Debug)]
pub struct SidekickArgs {
    /// Root of the Rust repository.
    #[arg(long, value_name = "DIR", env = "LIBRARIAN_REPO")]
    pub repo: PathBuf,

    /// Root of a googleapis checkout used for API discovery.
    #[arg(long, value_name = "DIR", env = "LIBRARIAN_GOOGLEAPIS")]
    pub googleapis: Option<PathBuf>,

    /// Grouping policy (service, channel).
    #[arg(long, value_name = "POLICY", default_value_t = Language::Rust.conventional_policy())]
    pub one_library_per: GroupingPolicy,

    /// Glob of discovered API paths to leave out. May be repeated.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Write librarian.yaml here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `sidekick` command.
pub fn execute(args: SidekickArgs) -> Result<()> {
    info!("Reading sidekick configuration from {}", args.repo.display());
    let inputs = SidekickReader::new(&args.repo)
        .read_all()
        .with_context(|| format!("Failed to read sidekick configuration in {}", args.repo.display()))?;

    let discovered = super::discover(args.googleapis.as_deref(), &args.exclude)?;
    let config = orchestrator::execute_sidekick_migration(&inputs, args.one_library_per, &discovered)
        .context("Migration failed")?;

    super::write_output(&config, args.output.as_deref())
}
