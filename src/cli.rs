//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// librarian-migrate - Convert client library generation config to librarian.yaml
#[derive(Parser, Debug)]
#[command(name = "librarian-migrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize log output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate a repository's .librarian/ state into librarian.yaml
    Migrate(commands::migrate::MigrateArgs),

    /// Migrate a Rust repository's .sidekick.toml files into librarian.yaml
    Sidekick(commands::sidekick::SidekickArgs),

    /// List every library a librarian.yaml resolves to
    Resolve(commands::resolve::ResolveArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level, &self.color)?;

        match self.command {
            Commands::Migrate(args) => commands::migrate::execute(args),
            Commands::Sidekick(args) => commands::sidekick::execute(args),
            Commands::Resolve(args) => commands::resolve::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Logs go to stderr so that YAML written to stdout stays clean.
fn init_logging(log_level: &str, color: &str) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::Builder::from_env(env)
        .parse_write_style(color)
        .format_timestamp(None)
        .format_target(false)
        .try_init()?;
    Ok(())
}
