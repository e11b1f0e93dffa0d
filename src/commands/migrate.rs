//! # Migrate Command Implementation
//!
//! This module implements the `migrate` subcommand, which reads the legacy
//! `.librarian/` files of a Python or Go repository and writes the equivalent
//! minimal `librarian.yaml`.
//!
//! ## Functionality
//!
//! - **Language Detection**: `--language` may be omitted when the repository
//!   directory is named like `google-cloud-python`.
//! - **Grouping Policy**: `--one-library-per` defaults to the language's
//!   convention.
//! - **API Discovery**: with `--googleapis`, every API in the checkout is part
//!   of the migration; APIs no library lists become implicit libraries.
//!
//! The repository itself is never modified unless `--output` points into it.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use librarian_migrate::config::Language;
use librarian_migrate::legacy::LegacyReader;
use librarian_migrate::naming::GroupingPolicy;
use librarian_migrate::phases::orchestrator;

/// Migrate a repository's .librarian/ state into librarian.yaml
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Root of the repository to migrate.
    #[arg(long, value_name = "DIR", env = "LIBRARIAN_REPO")]
    pub repo: PathBuf,

    /// Root of a googleapis checkout used for BUILD.bazel metadata and API
    /// discovery.
    #[arg(long, value_name = "DIR", env = "LIBRARIAN_GOOGLEAPIS")]
    pub googleapis: Option<PathBuf>,

    /// Repository language (go, python, rust). Detected from --repo if omitted.
    #[arg(long, value_name = "LANG")]
    pub language: Option<Language>,

    /// Grouping policy (service, channel). Defaults to the language convention.
    #[arg(long, value_name = "POLICY")]
    pub one_library_per: Option<GroupingPolicy>,

    /// Glob of discovered API paths to leave out. May be repeated.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Write librarian.yaml here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `migrate` command.
pub fn execute(args: MigrateArgs) -> Result<()> {
    let language = match args.language {
        Some(language) => language,
        None => Language::detect(&args.repo).context("Pass --language explicitly")?,
    };
    let policy = args
        .one_library_per
        .unwrap_or_else(|| language.conventional_policy());
    info!(
        "Migrating {} ({}, one_library_per={})",
        args.repo.display(),
        language,
        policy
    );

    let mut reader = LegacyReader::new(&args.repo);
    if let Some(googleapis) = &args.googleapis {
        reader = reader.with_googleapis(googleapis);
    }
    let inputs = reader
        .read_all(language)
        .with_context(|| format!("Failed to read legacy configuration in {}", args.repo.display()))?;

    let discovered = super::discover(args.googleapis.as_deref(), &args.exclude)?;
    let config = orchestrator::execute_migration(&inputs, language, policy, &discovered)
        .context("Migration failed")?;
    info!(
        "{} libraries listed explicitly, {} versions recorded",
        config.libraries.len(),
        config.versions.len()
    );

    super::write_output(&config, args.output.as_deref())
}
