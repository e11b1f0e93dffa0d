//! Orchestrator for the complete migration
//!
//! This module chains the phases into the pipelines the commands run: a
//! legacy migration, a sidekick migration and the resolution of a migrated
//! configuration back into its full library list.

use super::{phase1, phase2, phase3};
use crate::config::{Configuration, Language, Library};
use crate::error::Result;
use crate::legacy::LegacyInputs;
use crate::naming::GroupingPolicy;
use crate::sidekick::{self, SidekickInputs};
use crate::version::select_default_api;
use serde::Serialize;

/// Execute a migration from legacy inputs (Phases 1-3)
///
/// 1. Merge state, overrides, BUILD metadata and generator input
/// 2. Strip values equal to the inferred defaults
/// 3. Group `discovered` and listed API paths into libraries, then keep only
///    what cannot be derived
///
/// The result is sorted and ready to serialize.
pub fn execute_migration(
    inputs: &LegacyInputs,
    language: Language,
    policy: GroupingPolicy,
    discovered: &[String],
) -> Result<Configuration> {
    // Phase 1: Merge
    let mut config = phase1::execute(inputs, language, policy)?;

    // Phase 2: Deduplicate
    phase2::execute(&mut config);

    // Phase 3: Group and minimise
    minimize(&mut config, policy, discovered)?;

    Ok(config)
}

/// Execute a migration from sidekick inputs
///
/// Without a googleapis checkout, `discovered` may be empty: the API paths
/// listed by the crates are then the whole universe.
pub fn execute_sidekick_migration(
    inputs: &SidekickInputs,
    policy: GroupingPolicy,
    discovered: &[String],
) -> Result<Configuration> {
    let mut config = sidekick::build_configuration(inputs, policy);
    phase2::execute(&mut config);
    minimize(&mut config, policy, discovered)?;
    Ok(config)
}

/// Rewrites an already migrated configuration into its minimal form.
///
/// Applying this to the output of a migration returns it unchanged.
pub fn execute_normalize(config: &Configuration, discovered: &[String]) -> Result<Configuration> {
    let policy = config.grouping_policy()?;
    let mut normalized = config.clone();
    normalized.libraries = phase3::rehydrate(config, discovered)?;
    phase2::execute(&mut normalized);
    minimize(&mut normalized, policy, discovered)?;
    Ok(normalized)
}

fn minimize(
    config: &mut Configuration,
    policy: GroupingPolicy,
    discovered: &[String],
) -> Result<()> {
    let grouping = phase3::execute(policy, discovered, &config.libraries, &config.name_overrides)?;
    phase3::minimize(config, &grouping);
    // Libraries listed with their grouped APIs may be back to a single API.
    phase2::execute(config);
    config.sort();
    Ok(())
}

/// One library of a migrated configuration, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLibrary {
    pub name: String,
    pub apis: Vec<String>,
    /// The API whose version is preferred, when the library has any.
    pub default_api: Option<String>,
    /// Whether the library appears under `libraries` in the configuration.
    pub explicit: bool,
    pub version: Option<String>,
    /// The library with repository defaults filled in.
    pub effective: Library,
}

/// Execute resolution of a migrated configuration
///
/// Returns every library, explicit or implicit, sorted by name.
pub fn execute_resolve(config: &Configuration, discovered: &[String]) -> Result<Vec<ResolvedLibrary>> {
    let libraries = phase3::rehydrate(config, discovered)?;
    Ok(libraries
        .into_iter()
        .map(|library| {
            let apis: Vec<String> = library.api_paths().into_iter().map(str::to_string).collect();
            ResolvedLibrary {
                name: library.name.clone(),
                default_api: select_default_api(&apis).map(str::to_string),
                explicit: config.library(&library.name).is_some(),
                version: library.version.clone(),
                effective: phase2::inherit_defaults(&library, &config.defaults),
                apis,
            }
        })
        .collect())
}
