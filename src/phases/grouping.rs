//! Phase 3: Library Grouping
//!
//! Decides which library owns each API path and which of those libraries must
//! be written out explicitly.
//!
//! ## Resolution
//!
//! 1. Every API path listed by an existing library is *claimed* by it. A path
//!    claimed by two libraries is an [`Error::AmbiguousOwnership`].
//! 2. Discovered and claimed paths are grouped by their service key under the
//!    grouping policy. A group's canonical name is derived from its first path
//!    in sorted order.
//! 3. A group with claimants is split among them. Its unclaimed paths go to
//!    the claimant named after the group, or else to the claimant of the
//!    group's first claimed path.
//! 4. A group without claimants becomes a library named by the
//!    `name_overrides` entry for its canonical name, or by the canonical name
//!    itself. An existing library without API paths and with that name adopts
//!    the group.
//! 5. Existing libraries without API paths that adopted nothing are kept as
//!    handwritten libraries.
//!
//! ## Minimisation
//!
//! [`minimize`] rewrites a configuration into its smallest equivalent form. A
//! library that owns exactly one whole group, all of whose paths were
//! discovered, has *implicit* APIs: they follow from the policy and are not
//! written. Such a library is listed only when it carries extra
//! configuration, and its name is recorded in `name_overrides` when it differs
//! from the canonical one. Every other library lists its APIs, including
//! libraries over paths discovery never produces (unversioned APIs, excluded
//! or missing directories).
//!
//! [`rehydrate`] reverses this, rebuilding the full library list from a
//! minimised configuration and the discovered API paths.

use crate::config::{Configuration, Library};
use crate::error::{Error, Result};
use crate::naming::{derive_library_name, service_key, GroupingPolicy};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// A library as resolved from API paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedLibrary {
    pub name: String,
    /// Name derived from the first API path, or `name` for handwritten
    /// libraries.
    pub canonical_name: String,
    /// Sorted.
    pub api_paths: Vec<String>,
    /// The library owns exactly one whole group of discovered paths, so its
    /// APIs need not be listed.
    pub implicit_apis: bool,
}

impl GroupedLibrary {
    pub fn is_handwritten(&self) -> bool {
        self.api_paths.is_empty()
    }

    /// Whether an implicit library needs a `name_overrides` entry.
    pub fn needs_name_override(&self) -> bool {
        self.implicit_apis && self.name != self.canonical_name
    }
}

/// Result of grouping API paths into libraries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub policy: GroupingPolicy,
    /// Sorted by name.
    pub libraries: Vec<GroupedLibrary>,
}

impl Grouping {
    pub fn library(&self, name: &str) -> Option<&GroupedLibrary> {
        self.libraries.iter().find(|lib| lib.name == name)
    }

    /// API path to owning library name.
    pub fn owners(&self) -> BTreeMap<&str, &str> {
        self.libraries
            .iter()
            .flat_map(|lib| lib.api_paths.iter().map(move |p| (p.as_str(), lib.name.as_str())))
            .collect()
    }

    /// API path to canonical library name under the policy.
    pub fn canonical_names(&self) -> BTreeMap<String, String> {
        self.libraries
            .iter()
            .flat_map(|lib| lib.api_paths.iter())
            .map(|p| (p.clone(), derive_library_name(self.policy, p)))
            .collect()
    }

    /// Canonical name to actual name for implicit libraries that are renamed.
    pub fn name_overrides(&self) -> BTreeMap<String, String> {
        self.libraries
            .iter()
            .filter(|lib| lib.needs_name_override())
            .map(|lib| (lib.canonical_name.clone(), lib.name.clone()))
            .collect()
    }
}

/// Groups `discovered` API paths together with those claimed by `existing`
/// libraries.
pub fn execute(
    policy: GroupingPolicy,
    discovered: &[String],
    existing: &[Library],
    existing_name_overrides: &BTreeMap<String, String>,
) -> Result<Grouping> {
    let mut names = BTreeSet::new();
    for library in existing {
        if !names.insert(library.name.as_str()) {
            return Err(Error::DuplicateLibrary {
                name: library.name.clone(),
            });
        }
    }

    let claims = collect_claims(existing)?;

    let discovered: BTreeSet<&str> = discovered.iter().map(|p| p.trim_matches('/')).collect();
    if !discovered.is_empty() {
        for (&path, owner) in &claims {
            if !discovered.contains(path) {
                warn!("{} lists {}, which was not discovered", owner, path);
            }
        }
    }

    let all_paths: BTreeSet<&str> = discovered
        .iter()
        .copied()
        .chain(claims.keys().copied())
        .collect();
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &path in &all_paths {
        groups.entry(service_key(policy, path)).or_default().push(path);
    }

    let mut assigned: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut unowned: Vec<(String, &[&str])> = Vec::new();

    for paths in groups.values() {
        let canonical = derive_library_name(policy, paths[0]);
        let mut claimed = paths.iter().filter_map(|p| claims.get(p).copied());
        let Some(first_owner) = claimed.next() else {
            unowned.push((canonical, paths.as_slice()));
            continue;
        };
        let fallback = if paths.iter().any(|p| claims.get(p) == Some(&canonical.as_str())) {
            canonical.as_str()
        } else {
            first_owner
        };
        for path in paths {
            let owner = claims.get(path).copied().unwrap_or(fallback);
            assigned
                .entry(owner.to_string())
                .or_default()
                .insert(path.to_string());
        }
    }

    for (canonical, paths) in unowned {
        let name = existing_name_overrides
            .get(&canonical)
            .cloned()
            .unwrap_or(canonical);
        if assigned.contains_key(&name) {
            return Err(Error::DuplicateLibrary { name });
        }
        debug!("{} resolves to {} API path(s)", name, paths.len());
        assigned.insert(name, paths.iter().map(|p| p.to_string()).collect());
    }

    for library in existing {
        if library.is_handwritten() {
            assigned.entry(library.name.clone()).or_default();
        }
    }

    for (canonical, name) in existing_name_overrides {
        if !assigned.contains_key(name) {
            warn!("Name override {} -> {} matches no library", canonical, name);
        }
    }

    let libraries = assigned
        .into_iter()
        .map(|(name, paths)| {
            let api_paths: Vec<String> = paths.into_iter().collect();
            let (canonical_name, implicit_apis) = match api_paths.first() {
                None => (name.clone(), false),
                Some(first) => {
                    let key = service_key(policy, first);
                    let whole_group = groups
                        .get(key)
                        .is_some_and(|group| group.iter().copied().eq(api_paths.iter().map(String::as_str)));
                    let all_discovered = api_paths.iter().all(|p| discovered.contains(p.as_str()));
                    (derive_library_name(policy, first), whole_group && all_discovered)
                }
            };
            GroupedLibrary {
                name,
                canonical_name,
                api_paths,
                implicit_apis,
            }
        })
        .collect();

    Ok(Grouping { policy, libraries })
}

/// API path to the single library that lists it.
fn collect_claims(existing: &[Library]) -> Result<BTreeMap<&str, &str>> {
    let mut claims: BTreeMap<&str, &str> = BTreeMap::new();
    for library in existing {
        for path in library.api_paths() {
            let path = path.trim_matches('/');
            match claims.get(path) {
                Some(owner) if *owner != library.name => {
                    let (first, second) = if *owner < library.name.as_str() {
                        (*owner, library.name.as_str())
                    } else {
                        (library.name.as_str(), *owner)
                    };
                    return Err(Error::AmbiguousOwnership {
                        api_path: path.to_string(),
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    claims.insert(path, library.name.as_str());
                }
            }
        }
    }
    Ok(claims)
}

/// Rewrites `config` into its minimal form according to `grouping`.
///
/// Library versions move into `config.versions`. Libraries absent from
/// `grouping` are dropped.
pub fn minimize(config: &mut Configuration, grouping: &Grouping) {
    let mut libraries = Vec::new();

    for grouped in &grouping.libraries {
        let Some(mut library) = config.library(&grouped.name).cloned() else {
            continue;
        };
        if let Some(version) = library.version.take() {
            config.versions.entry(grouped.name.clone()).or_insert(version);
        }

        if grouped.is_handwritten() {
            library.clear_api_paths();
            libraries.push(library);
        } else if grouped.implicit_apis {
            if library.has_extra_config() {
                library.clear_api_paths();
                libraries.push(library);
            }
        } else {
            library.set_api_paths(grouped.api_paths.iter().cloned());
            libraries.push(library);
        }
    }

    config.libraries = libraries;
    config.name_overrides = grouping.name_overrides();
}

/// Rebuilds the complete library list of a minimised configuration.
///
/// Every returned library lists its API paths and carries its version from
/// `config.versions`. The result is sorted by name.
pub fn rehydrate(config: &Configuration, discovered: &[String]) -> Result<Vec<Library>> {
    let policy = config.defaults.one_library_per.ok_or_else(|| Error::MissingGroupingPolicy {
        context: Some("resolving implicit libraries".to_string()),
    })?;
    let grouping = execute(policy, discovered, &config.libraries, &config.name_overrides)?;

    Ok(grouping
        .libraries
        .iter()
        .map(|grouped| {
            let mut library = config
                .library(&grouped.name)
                .cloned()
                .unwrap_or_else(|| Library::named(&grouped.name));
            if !grouped.is_handwritten() {
                library.set_api_paths(grouped.api_paths.iter().cloned());
            }
            if library.version.is_none() {
                library.version = config.versions.get(&grouped.name).cloned();
            }
            library
        })
        .collect())
}
