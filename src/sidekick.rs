//! # Sidekick Reader
//!
//! Reads the TOML configuration used by Rust repositories before
//! `librarian.yaml` and turns it into a full [`Configuration`].
//!
//! ## Sources
//!
//! - **Root `.sidekick.toml`**: repository defaults. `[codec]` holds a comma
//!   separated `disabled-rustdoc-warnings` list and any number of
//!   `package:<name>` dependency specs; `[release]` holds `remote` and
//!   `branch`.
//! - **`src/generated/**/.sidekick.toml`**: one per generated crate, naming the
//!   API it is generated from in `general.specification-source`.
//! - **Sibling `Cargo.toml`**: the crate name and published version. These
//!   win over anything the sidekick file says.
//! - **Existing `librarian.yaml`** (optional): hand-made library blocks and
//!   the `versions` map, preserved across the migration.

use crate::config::{
    self, Configuration, Defaults, Language, Library, RustCrate, RustDefaults,
    RustPackageDependency,
};
use crate::error::{Error, Result};
use crate::naming::GroupingPolicy;
use crate::properties::{parse_key_values, PropertyBag};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SIDEKICK_FILE: &str = ".sidekick.toml";
pub const GENERATED_DIR: &str = "src/generated";
pub const LIBRARIAN_FILE: &str = "librarian.yaml";
pub const DEFAULT_TAG_FORMAT: &str = "{name}/v{version}";
pub const DEFAULT_RELEASE_LEVEL: &str = "stable";

const PACKAGE_PREFIX: &str = "package:";

/// Defaults read from the root `.sidekick.toml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootDefaults {
    pub disabled_rustdoc_warnings: Vec<String>,
    /// Sorted by name.
    pub package_dependencies: Vec<RustPackageDependency>,
    pub remote: Option<String>,
    pub branch: Option<String>,
}

/// A crate found under `src/generated`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidekickLibrary {
    pub name: String,
    pub api_paths: Vec<String>,
    pub version: Option<String>,
}

/// Everything read from a sidekick repository.
#[derive(Debug, Clone, Default)]
pub struct SidekickInputs {
    pub root: RootDefaults,
    pub libraries: BTreeMap<String, SidekickLibrary>,
    pub existing: Option<Configuration>,
}

#[derive(Debug, Default, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    general: LibraryGeneral,
    #[serde(default)]
    codec: LibraryCodec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct LibraryGeneral {
    #[serde(default)]
    specification_source: String,
}

#[derive(Debug, Default, Deserialize)]
struct LibraryCodec {
    #[serde(default)]
    version: String,
}

#[derive(Debug, Default, Deserialize)]
struct CargoManifest {
    #[serde(default)]
    package: CargoPackage,
}

#[derive(Debug, Default, Deserialize)]
struct CargoPackage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: Option<toml::Value>,
}

/// Parses the root `.sidekick.toml`.
pub fn parse_root(content: &str) -> Result<RootDefaults> {
    let table: toml::Table = toml::from_str(content)?;
    let bag = PropertyBag::new(&table);
    let codec = bag.section("codec");
    let release = bag.section("release");

    let mut package_dependencies: Vec<RustPackageDependency> = codec
        .prefixed_strings(PACKAGE_PREFIX)
        .into_iter()
        .map(|(name, spec)| parse_package_dependency(name, spec))
        .collect();
    package_dependencies.sort();

    Ok(RootDefaults {
        disabled_rustdoc_warnings: codec.get_string_list("disabled-rustdoc-warnings"),
        package_dependencies,
        remote: release.get_str("remote").map(str::to_string),
        branch: release.get_str("branch").map(str::to_string),
    })
}

/// Parses a `package:<name>` spec such as
/// `package=google-cloud-wkt,source=google.protobuf,force-used=true`.
///
/// Unknown keys are ignored.
pub fn parse_package_dependency(name: &str, spec: &str) -> RustPackageDependency {
    let mut dependency = RustPackageDependency {
        name: name.to_string(),
        ..Default::default()
    };
    for (key, value) in parse_key_values(spec) {
        match key.as_str() {
            "package" => dependency.package = Some(value),
            "source" => dependency.source = Some(value),
            "force-used" => dependency.force_used = value == "true",
            "used-if" => dependency.used_if = Some(value),
            "feature" => dependency.feature = Some(value),
            other => debug!("Ignoring key {:?} in package:{}", other, name),
        }
    }
    dependency
}

/// Reads the sidekick files of one repository.
#[derive(Debug, Clone)]
pub struct SidekickReader {
    repo_root: PathBuf,
}

impl SidekickReader {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        SidekickReader {
            repo_root: repo_root.into(),
        }
    }

    pub fn read_all(&self) -> Result<SidekickInputs> {
        let existing = self.read_existing()?;
        let root = self.read_root()?;
        let files = self.find_library_files()?;
        info!("Found {} {} files", files.len(), SIDEKICK_FILE);

        let mut libraries: BTreeMap<String, SidekickLibrary> = BTreeMap::new();
        for file in &files {
            let Some(found) = read_library(file)? else {
                continue;
            };
            let library = libraries
                .entry(found.name.clone())
                .or_insert_with(|| SidekickLibrary {
                    name: found.name.clone(),
                    ..Default::default()
                });
            for path in found.api_paths {
                if !library.api_paths.contains(&path) {
                    library.api_paths.push(path);
                }
            }
            if found.version.is_some() {
                library.version = found.version;
            }
        }

        Ok(SidekickInputs {
            root,
            libraries,
            existing,
        })
    }

    /// Reads the root `.sidekick.toml`, which must exist.
    pub fn read_root(&self) -> Result<RootDefaults> {
        let path = self.repo_root.join(SIDEKICK_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::LegacyInput {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        parse_root(&content).map_err(|e| Error::LegacyInput {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Lists `.sidekick.toml` files under `src/generated`, sorted.
    pub fn find_library_files(&self) -> Result<Vec<PathBuf>> {
        let generated = self.repo_root.join(GENERATED_DIR);
        if !generated.is_dir() {
            warn!("{} does not exist", generated.display());
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&generated).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name() == SIDEKICK_FILE {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Reads `librarian.yaml` from the repository root, if there is one.
    pub fn read_existing(&self) -> Result<Option<Configuration>> {
        let path = self.repo_root.join(LIBRARIAN_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        debug!("Preserving configuration from {}", path.display());
        config::from_file(&path).map(Some)
    }
}

/// Reads one generated crate from its `.sidekick.toml` and `Cargo.toml`.
///
/// Returns `None` when the file names no API or the manifest names no
/// package.
pub fn read_library(sidekick_path: &Path) -> Result<Option<SidekickLibrary>> {
    let invalid = |path: &Path, message: String| Error::LegacyInput {
        source_name: path.display().to_string(),
        message,
    };

    let content = std::fs::read_to_string(sidekick_path)?;
    let file: LibraryFile =
        toml::from_str(&content).map_err(|e| invalid(sidekick_path, e.to_string()))?;
    let api_path = file.general.specification_source.trim_matches('/');
    if api_path.is_empty() {
        debug!("{} has no specification-source", sidekick_path.display());
        return Ok(None);
    }

    let cargo_path = sidekick_path
        .parent()
        .map(|dir| dir.join("Cargo.toml"))
        .ok_or_else(|| invalid(sidekick_path, "no parent directory".to_string()))?;
    let manifest_content = std::fs::read_to_string(&cargo_path)
        .map_err(|e| invalid(&cargo_path, e.to_string()))?;
    let manifest: CargoManifest =
        toml::from_str(&manifest_content).map_err(|e| invalid(&cargo_path, e.to_string()))?;
    if manifest.package.name.is_empty() {
        return Ok(None);
    }

    // `version.workspace = true` parses as a table and carries no version.
    let cargo_version = manifest
        .package
        .version
        .as_ref()
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let version = cargo_version.or_else(|| Some(file.codec.version).filter(|v| !v.is_empty()));

    Ok(Some(SidekickLibrary {
        name: manifest.package.name,
        api_paths: vec![api_path.to_string()],
        version,
    }))
}

/// Builds the full, unminimised configuration of a sidekick repository.
pub fn build_configuration(inputs: &SidekickInputs, policy: GroupingPolicy) -> Configuration {
    let root = &inputs.root;
    let mut config = Configuration::new(Language::Rust);

    let rust = RustDefaults {
        disabled_rustdoc_warnings: root.disabled_rustdoc_warnings.clone(),
        package_dependencies: root.package_dependencies.clone(),
    };
    config.defaults = Defaults {
        output: Some(Language::Rust.output_template().to_string()),
        one_library_per: Some(policy),
        release_level: Some(DEFAULT_RELEASE_LEVEL.to_string()),
        tag_format: Some(DEFAULT_TAG_FORMAT.to_string()),
        remote: root.remote.clone(),
        branch: root.branch.clone(),
        rust: Some(rust).filter(|r| r != &RustDefaults::default()),
        ..Default::default()
    };

    let existing = inputs.existing.as_ref();
    if let Some(existing) = existing {
        config.versions = existing.versions.clone();
        config.name_overrides = existing.name_overrides.clone();
    }

    for found in inputs.libraries.values() {
        let mut library = Library::named(&found.name);
        library.set_api_paths(found.api_paths.iter().cloned());
        if let Some(version) = &found.version {
            config.versions.insert(found.name.clone(), version.clone());
        }
        if let Some(customized) = existing.and_then(|e| e.library(&found.name)) {
            preserve_customizations(&mut library, customized);
        }
        config.libraries.push(library);
    }

    if let Some(existing) = existing {
        for library in &existing.libraries {
            if inputs.libraries.contains_key(&library.name) {
                continue;
            }
            debug!("Keeping {} from {}", library.name, LIBRARIAN_FILE);
            let mut library = library.clone();
            if let Some(version) = library.version.take() {
                config.versions.entry(library.name.clone()).or_insert(version);
            }
            config.libraries.push(library);
        }
    }

    config.sort();
    config
}

/// Copies hand-made settings of an existing library onto a freshly read one.
fn preserve_customizations(library: &mut Library, existing: &Library) {
    if existing.generate.is_some() {
        library.generate = existing.generate.clone();
    }
    if existing.release.is_some() {
        library.release = existing.release.clone();
    }
    if existing.copyright_year.is_some() {
        library.copyright_year = existing.copyright_year.clone();
    }
    if !existing.keep.is_empty() {
        library.keep = existing.keep.clone();
    }
    let Some(theirs) = existing.rust.as_ref() else {
        return;
    };
    let ours = library.rust.get_or_insert_with(RustCrate::default);
    ours.per_service_features |= theirs.per_service_features;
    ours.generate_setter_samples |= theirs.generate_setter_samples;
    if !theirs.disabled_rustdoc_warnings.is_empty() {
        ours.disabled_rustdoc_warnings = theirs.disabled_rustdoc_warnings.clone();
    }
    if !theirs.package_dependencies.is_empty() {
        ours.package_dependencies = theirs.package_dependencies.clone();
    }
    if !theirs.pagination_overrides.is_empty() {
        ours.pagination_overrides = theirs.pagination_overrides.clone();
    }
}
