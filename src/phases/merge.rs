//! Phase 1: Configuration Merge
//!
//! Folds the legacy sources into one [`Configuration`]. The state file decides
//! which libraries exist and which APIs they hold; the other sources only add
//! fields:
//!
//! 1. state: APIs, keep patterns, tag formats, versions
//! 2. overrides: generate/release blocks (always applied)
//! 3. build metadata: transport, REST enum style, language options
//! 4. generator input (Go only): module path version, per-API settings
//!
//! A later source never replaces a field an earlier one already set.
//!
//! Once every library is built the list is sorted by name and repository-wide
//! defaults are inferred from it. Sorting first keeps the inference
//! independent of state file order.

use crate::config::{
    Configuration, GoApi, GoModule, Language, Library, LibraryGenerate, LibraryRelease,
    PythonPackage,
};
use crate::error::{Error, Result};
use crate::legacy::{BuildLibrary, GeneratorModule, LegacyConfigLibrary, LegacyInputs};
use crate::naming::GroupingPolicy;
use crate::version::parse_release_version;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Keep patterns Python regenerates unconditionally. `{name}` is replaced
/// with the library name before matching.
pub const PYTHON_KEEP_DENYLIST: [&str; 7] = [
    "packages/{name}/CHANGELOG.md",
    "docs/CHANGELOG.md",
    "docs/README.rst",
    "samples/README.txt",
    "scripts/client-post-processing",
    "samples/snippets/README.rst",
    "tests/system",
];

/// Share of libraries (in percent) a value needs to become the default.
pub const DEFAULT_THRESHOLD_PERCENT: usize = 80;

/// Merges legacy inputs into a configuration for `language`.
pub fn execute(
    inputs: &LegacyInputs,
    language: Language,
    policy: GroupingPolicy,
) -> Result<Configuration> {
    let mut seen = BTreeSet::new();
    for library in &inputs.state.libraries {
        if !seen.insert(library.id.as_str()) {
            return Err(Error::DuplicateLibrary {
                name: library.id.clone(),
            });
        }
    }

    let overrides: BTreeMap<&str, &LegacyConfigLibrary> = inputs
        .config
        .libraries
        .iter()
        .map(|lib| (lib.id.as_str(), lib))
        .collect();

    let mut config = Configuration::new(language);
    let mut tag_formats: Vec<(String, String)> = Vec::new();

    for state_lib in &inputs.state.libraries {
        let mut library = Library::named(&state_lib.id);
        library.set_api_paths(unique(state_lib.api_paths()));
        library.keep = match language {
            Language::Python => filter_keep_patterns(&state_lib.preserve_regex, &state_lib.id),
            _ => state_lib.preserve_regex.clone(),
        };

        if let Some(tag_format) = state_lib.tag_format.as_deref().filter(|t| !t.is_empty()) {
            tag_formats.push((state_lib.id.clone(), tag_format.replace("{id}", "{name}")));
        }

        let version = inputs
            .package_versions
            .get(&state_lib.id)
            .or(state_lib.version.as_ref())
            .filter(|v| !v.is_empty());
        if let Some(version) = version {
            if let Err(e) = parse_release_version(version) {
                warn!("Library {} has a non-semver version {:?}: {}", state_lib.id, version, e);
            }
            config.versions.insert(state_lib.id.clone(), version.clone());
        }

        if let Some(overrides) = overrides.get(state_lib.id.as_str()) {
            apply_overrides(&mut library, overrides);
        }
        if let Some(build) = inputs.build.libraries.get(&state_lib.id) {
            apply_build(&mut library, build, language);
        }
        if language == Language::Go {
            if let Some(module) = inputs.generator_input.module(&state_lib.id) {
                apply_generator_module(&mut library, module);
            }
        }

        config.libraries.push(library);
    }

    for id in overrides.keys() {
        if !seen.contains(id) {
            warn!("Ignoring overrides for {}: not in state", id);
        }
    }

    config.sort();
    tag_formats.sort_by(|a, b| a.0.cmp(&b.0));

    config.defaults.output = Some(language.output_template().to_string());
    config.defaults.one_library_per = Some(policy);
    identify_defaults(&mut config, tag_formats.into_iter().map(|(_, t)| t));

    Ok(config)
}

fn unique<'a>(paths: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for path in paths {
        if !out.iter().any(|p| p == path) {
            out.push(path.to_string());
        }
    }
    out
}

fn apply_overrides(library: &mut Library, overrides: &LegacyConfigLibrary) {
    if overrides.generate_blocked {
        library.generate = Some(LibraryGenerate { disabled: true });
    }
    if overrides.release_blocked {
        library.release = Some(LibraryRelease { disabled: true });
    }
}

fn apply_build(library: &mut Library, build: &BuildLibrary, language: Language) {
    if library.transport.is_none() {
        library.transport = build.transport.clone();
    }
    if library.grpc_service_config.is_none() {
        library.grpc_service_config = build.grpc_service_config.clone();
    }
    if library.rest_numeric_enums.is_none() {
        library.rest_numeric_enums = build.rest_numeric_enums;
    }
    if library.release_level.is_none() {
        library.release_level = build.release_level.clone();
    }

    match language {
        Language::Python => {
            if build.opt_args.is_empty() && !build.is_proto_only {
                return;
            }
            let python = library.python.get_or_insert_with(PythonPackage::default);
            if python.opt_args.is_empty() {
                python.opt_args = build.opt_args.clone();
            }
            python.is_proto_only |= build.is_proto_only;
        }
        Language::Go => {
            if build.import_path.is_none() && !build.metadata {
                return;
            }
            let go = library.go.get_or_insert_with(GoModule::default);
            if go.import_path.is_none() {
                go.import_path = build.import_path.clone();
            }
            go.metadata |= build.metadata;
        }
        Language::Rust => {}
    }
}

fn apply_generator_module(library: &mut Library, module: &GeneratorModule) {
    let paths: Vec<String> = library.api_paths().into_iter().map(str::to_string).collect();
    let go = library.go.get_or_insert_with(GoModule::default);

    if go.module_path_version.is_none() {
        go.module_path_version = module.module_path_version.clone().filter(|v| !v.is_empty());
    }
    if go.delete_output_paths.is_empty() {
        go.delete_output_paths = module.delete_generation_output_paths.clone();
    }
    for api in &module.apis {
        if !paths.contains(&api.path) {
            warn!(
                "Ignoring generator input for {} in {}: not one of its APIs",
                api.path, module.name
            );
            continue;
        }
        if go.apis.iter().any(|a| a.path == api.path) {
            continue;
        }
        let go_api = GoApi {
            path: api.path.clone(),
            client_directory: api.client_directory.clone().filter(|d| !d.is_empty()),
            disable_gapic: api.disable_gapic,
            proto_package: api.proto_package.clone().filter(|p| !p.is_empty()),
            nested_protos: api.nested_protos.clone(),
        };
        if go_api != (GoApi { path: api.path.clone(), ..Default::default() }) {
            go.apis.push(go_api);
        }
    }
}

/// Drops Python keep patterns that name files regenerated on every run.
pub fn filter_keep_patterns(patterns: &[String], library_name: &str) -> Vec<String> {
    let denied: Vec<String> = PYTHON_KEEP_DENYLIST
        .iter()
        .map(|p| p.replace("{name}", library_name))
        .collect();
    patterns
        .iter()
        .filter(|pattern| !denied.iter().any(|d| pattern.contains(d.as_str())))
        .cloned()
        .collect()
}

/// The value held by at least [`DEFAULT_THRESHOLD_PERCENT`] of `values`,
/// with its count and the total number of values.
///
/// At most one value can clear a threshold above one half; the first one
/// encountered is returned regardless.
pub fn dominant_value<T, I>(values: I) -> Option<(T, usize, usize)>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let (counts, total) = tally(values);
    counts
        .into_iter()
        .find(|(_, count)| count * 100 >= total * DEFAULT_THRESHOLD_PERCENT)
        .map(|(value, count)| (value, count, total))
}

/// The most frequent value; ties go to the value encountered first.
pub fn plurality_value<T, I>(values: I) -> Option<(T, usize)>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let (counts, _) = tally(values);
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best
}

/// Counts values in first-encounter order.
fn tally<T: PartialEq, I: IntoIterator<Item = T>>(values: I) -> (Vec<(T, usize)>, usize) {
    let mut counts: Vec<(T, usize)> = Vec::new();
    let mut total = 0;
    for value in values {
        total += 1;
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    (counts, total)
}

fn percent(count: usize, total: usize) -> f64 {
    100.0 * count as f64 / total as f64
}

/// Infers repository defaults from the (sorted) libraries.
fn identify_defaults(config: &mut Configuration, tag_formats: impl Iterator<Item = String>) {
    let libraries = &config.libraries;

    if let Some((transport, count, total)) =
        dominant_value(libraries.iter().filter_map(|l| l.transport.clone()))
    {
        info!(
            "Identified default transport: {} ({:.1}% of libraries)",
            transport,
            percent(count, total)
        );
        config.defaults.transport = Some(transport);
    }

    if let Some((enums, count, total)) =
        dominant_value(libraries.iter().filter_map(|l| l.rest_numeric_enums))
    {
        info!(
            "Identified default rest_numeric_enums: {} ({:.1}% of libraries)",
            enums,
            percent(count, total)
        );
        config.defaults.rest_numeric_enums = Some(enums);
    }

    if let Some((level, count, total)) =
        dominant_value(libraries.iter().filter_map(|l| l.release_level.clone()))
    {
        info!(
            "Identified default release_level: {} ({:.1}% of libraries)",
            level,
            percent(count, total)
        );
        config.defaults.release_level = Some(level);
    }

    if let Some((tag_format, count)) = plurality_value(tag_formats) {
        info!("Identified default tag_format: {} ({} libraries)", tag_format, count);
        config.defaults.tag_format = Some(tag_format);
    }
}
