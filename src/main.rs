//! # librarian-migrate CLI
//!
//! This is the binary entry point for the `librarian-migrate` command-line
//! tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging from the global flags.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! The migration logic lives in the `librarian_migrate` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
