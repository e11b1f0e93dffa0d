//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `librarian-migrate` command-line tool, one file per subcommand.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, reads its inputs and
//!   calls into the `librarian_migrate` library.
//!
//! Paths always come from arguments (or their environment fallbacks); nothing
//! here assumes the working directory is the repository.

pub mod completions;
pub mod migrate;
pub mod resolve;
pub mod sidekick;

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use librarian_migrate::config::Configuration;
use librarian_migrate::discovery;

/// Lists the API paths of a googleapis checkout, or none without one.
pub(crate) fn discover(googleapis: Option<&Path>, excludes: &[String]) -> Result<Vec<String>> {
    let Some(root) = googleapis else {
        return Ok(Vec::new());
    };
    let patterns = discovery::compile_excludes(excludes).context("Invalid --exclude pattern")?;
    let apis = discovery::discover_apis(root, &patterns)
        .with_context(|| format!("Failed to discover APIs in {}", root.display()))?;
    info!("Discovered {} APIs in {}", apis.len(), root.display());
    Ok(apis)
}

/// Writes `config` to `output`, or to stdout when no path is given.
pub(crate) fn write_output(config: &Configuration, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            config
                .write(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let yaml = config.to_yaml().context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
    }
    Ok(())
}
