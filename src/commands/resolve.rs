//! # Resolve Command Implementation
//!
//! This module implements the `resolve` subcommand, which expands a migrated
//! `librarian.yaml` back into every library it describes.
//!
//! ## Output Formats
//!
//! - **table**: one line per library with its default API and API count.
//! - **json**: the resolved libraries, including their effective settings.
//! - **yaml**: the configuration rewritten into its minimal form.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use librarian_migrate::config;
use librarian_migrate::phases::orchestrator::{self, ResolvedLibrary};

/// Output format of the `resolve` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveFormat {
    Table,
    Json,
    Yaml,
}

/// List every library a librarian.yaml resolves to
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the librarian.yaml to resolve.
    #[arg(short, long, value_name = "FILE", default_value = "librarian.yaml")]
    pub config: PathBuf,

    /// Root of a googleapis checkout. Without it only listed APIs resolve.
    #[arg(long, value_name = "DIR", env = "LIBRARIAN_GOOGLEAPIS")]
    pub googleapis: Option<PathBuf>,

    /// Glob of discovered API paths to leave out. May be repeated.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    #[arg(long, value_enum, default_value_t = ResolveFormat::Table)]
    pub format: ResolveFormat,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs) -> Result<()> {
    let config = config::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let discovered = super::discover(args.googleapis.as_deref(), &args.exclude)?;

    match args.format {
        ResolveFormat::Yaml => {
            let normalized = orchestrator::execute_normalize(&config, &discovered)
                .context("Failed to normalize configuration")?;
            print!("{}", normalized.to_yaml()?);
        }
        ResolveFormat::Json => {
            let resolved = orchestrator::execute_resolve(&config, &discovered)
                .context("Failed to resolve libraries")?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        ResolveFormat::Table => {
            let resolved = orchestrator::execute_resolve(&config, &discovered)
                .context("Failed to resolve libraries")?;
            print!("{}", render_table(&resolved));
        }
    }
    Ok(())
}

fn render_table(libraries: &[ResolvedLibrary]) -> String {
    let width = libraries
        .iter()
        .map(|lib| lib.name.len())
        .max()
        .unwrap_or(0)
        .max("LIBRARY".len());
    let mut out = format!("{:<width$}  {:<8}  {:>4}  DEFAULT API\n", "LIBRARY", "SOURCE", "APIS");
    for lib in libraries {
        let source = if lib.explicit { "explicit" } else { "implicit" };
        out.push_str(&format!(
            "{:<width$}  {:<8}  {:>4}  {}\n",
            lib.name,
            source,
            lib.apis.len(),
            lib.default_api.as_deref().unwrap_or("-"),
        ));
    }
    out
}
