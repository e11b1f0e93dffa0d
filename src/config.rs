//! # `librarian.yaml` Schema and Parsing
//!
//! This module defines the data structures that represent the single-file
//! `librarian.yaml` configuration produced by a migration, as well as the
//! logic for parsing and writing it.
//!
//! ## Key Components
//!
//! - **`Configuration`**: The root document. Holds the repository language,
//!   repository-wide `Defaults`, the explicit `libraries` list, the
//!   `name_overrides` map and the `versions` map.
//!
//! - **`Library`**: One generated or handwritten library. Every field other
//!   than `name` is optional; absent fields inherit from `Defaults`.
//!
//! - **`Language`**: The closed set of supported target ecosystems.
//!
//! ## Determinism
//!
//! Maps are `BTreeMap`s, empty or unset fields are skipped on output and
//! [`Configuration::sort`] orders every list. A configuration that has been
//! sorted serializes to the same bytes after a parse/serialize round trip.
//!
//! ## API Fields
//!
//! A library with one API may write it as `api: x` or `apis: [x]`. Both forms
//! parse to the same [`Library::api_paths`], which every consumer reads
//! instead of touching the two fields directly.

use crate::error::{Error, Result};
use crate::naming::GroupingPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Schema version written to new configuration files.
pub const SCHEMA_VERSION: &str = "v1";

/// Target ecosystem of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Rust,
}

impl Language {
    /// All supported languages, in detection order.
    pub const ALL: [Language; 3] = [Language::Python, Language::Go, Language::Rust];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }

    /// The grouping policy repositories of this language conventionally use.
    ///
    /// Only the CLI consults this; the resolution core always takes the
    /// policy as an explicit argument.
    pub fn conventional_policy(&self) -> GroupingPolicy {
        match self {
            Language::Go | Language::Python => GroupingPolicy::Service,
            Language::Rust => GroupingPolicy::Channel,
        }
    }

    /// Output directory template for generated libraries.
    pub fn output_template(&self) -> &'static str {
        match self {
            Language::Go => "{name}",
            Language::Python => "packages/{name}/",
            Language::Rust => "src/generated/",
        }
    }

    /// Detects the language from a repository path such as
    /// `/src/google-cloud-python`.
    ///
    /// The path matches a language when it contains `cloud-<lang>` or ends
    /// with `-<lang>`.
    pub fn detect<P: AsRef<Path>>(repo_path: P) -> Result<Language> {
        let raw = repo_path.as_ref().to_string_lossy().to_lowercase();
        let lower = raw.trim_end_matches('/');
        Language::ALL
            .into_iter()
            .find(|lang| {
                lower.contains(&format!("cloud-{}", lang.as_str()))
                    || lower.ends_with(&format!("-{}", lang.as_str()))
            })
            .ok_or_else(|| Error::UnsupportedLanguage {
                value: format!("(could not detect from {})", repo_path.as_ref().display()),
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "go" => Ok(Language::Go),
            "python" => Ok(Language::Python),
            "rust" => Ok(Language::Rust),
            other => Err(Error::UnsupportedLanguage {
                value: other.to_string(),
            }),
        }
    }
}

/// Root of a `librarian.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Schema version of the document.
    #[serde(default = "default_schema_version")]
    pub version: String,

    /// Target language. Required for generation, optional while parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Repository-wide defaults every library inherits.
    #[serde(default, skip_serializing_if = "Defaults::is_empty")]
    pub defaults: Defaults,

    /// Canonical derived name to actual library name, only where they differ.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub name_overrides: BTreeMap<String, String>,

    /// Library name to currently published version.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, String>,

    /// Libraries that cannot be left implicit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Repository-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Output directory template, with `{name}` replaced per library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_library_per: Option<GroupingPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_numeric_enums: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_level: Option<String>,

    /// Release tag template, e.g. `{name}-v{version}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_format: Option<String>,

    /// Git remote releases are pushed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Branch releases are cut from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustDefaults>,
}

impl Defaults {
    pub fn is_empty(&self) -> bool {
        self == &Defaults::default()
    }
}

/// Rust defaults shared by every generated crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RustDefaults {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,
}

/// A dependency the Rust generator maps a proto package to.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RustPackageDependency {
    /// Crate name as referenced in generated code.
    pub name: String,

    /// Crate name on crates.io when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Proto package this dependency provides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub force_used: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_if: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

/// One library in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,

    /// Released version. Migrations move this into [`Configuration::versions`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Single-API shorthand for `apis`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apis: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_numeric_enums: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_service_config: Option<String>,

    /// Path patterns that survive regeneration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keep: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<LibraryGenerate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<LibraryRelease>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<PythonPackage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go: Option<GoModule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustCrate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryGenerate {
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryRelease {
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

/// Python-specific generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PythonPackage {
    /// Extra `opt_args` passed to the GAPIC generator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opt_args: Vec<String>,

    /// The package has no GAPIC layer, only generated protos.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_proto_only: bool,
}

impl PythonPackage {
    pub fn is_empty(&self) -> bool {
        self == &PythonPackage::default()
    }
}

/// Go-specific generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoModule {
    /// Major version suffix of the module path, e.g. `v2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path_version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete_output_paths: Vec<String>,

    /// Go package import path from the GAPIC rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,

    /// Whether `gapic_metadata.json` is generated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub metadata: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apis: Vec<GoApi>,
}

impl GoModule {
    pub fn is_empty(&self) -> bool {
        self == &GoModule::default()
    }
}

/// Per-API Go overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoApi {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_directory: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_gapic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto_package: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_protos: Vec<String>,
}

/// Rust-specific crate options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RustCrate {
    #[serde(default, skip_serializing_if = "is_false")]
    pub per_service_features: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub generate_setter_samples: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pagination_overrides: Vec<PaginationOverride>,
}

impl RustCrate {
    pub fn is_empty(&self) -> bool {
        self == &RustCrate::default()
    }
}

/// Overrides the item field of a paginated method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationOverride {
    pub id: String,
    pub item_field: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Library {
    /// Creates a library with a name and nothing else.
    pub fn named(name: impl Into<String>) -> Self {
        Library {
            name: name.into(),
            ..Default::default()
        }
    }

    /// API paths of the library, reading `api` and `apis` as one list.
    ///
    /// Duplicates are dropped and the order is the order of first appearance.
    pub fn api_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::with_capacity(self.apis.len() + 1);
        for path in self.api.iter().chain(self.apis.iter()) {
            if !paths.contains(&path.as_str()) {
                paths.push(path.as_str());
            }
        }
        paths
    }

    /// Replaces the API list, storing it in the expanded `apis` form.
    pub fn set_api_paths<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api = None;
        self.apis = paths.into_iter().map(Into::into).collect();
    }

    pub fn clear_api_paths(&mut self) {
        self.api = None;
        self.apis.clear();
    }

    /// A handwritten library has no APIs to generate from.
    pub fn is_handwritten(&self) -> bool {
        self.api.is_none() && self.apis.is_empty()
    }

    /// True when the library carries configuration beyond its name, APIs and
    /// version, so it cannot be left implicit.
    pub fn has_extra_config(&self) -> bool {
        self.copyright_year.is_some()
            || self.transport.is_some()
            || self.release_level.is_some()
            || self.rest_numeric_enums.is_some()
            || self.grpc_service_config.is_some()
            || !self.keep.is_empty()
            || self.generate.is_some()
            || self.release.is_some()
            || self.python.is_some()
            || self.go.is_some()
            || self.rust.is_some()
    }

    fn sort(&mut self) {
        self.apis.sort();
        self.apis.dedup();
        self.keep.sort();
        self.keep.dedup();
        if let Some(python) = self.python.as_mut() {
            python.opt_args.sort();
        }
        if let Some(go) = self.go.as_mut() {
            go.delete_output_paths.sort();
            go.apis.sort_by(|a, b| a.path.cmp(&b.path));
        }
        if let Some(rust) = self.rust.as_mut() {
            rust.package_dependencies.sort();
        }
    }
}

impl Configuration {
    /// Creates an empty configuration for `language`.
    pub fn new(language: Language) -> Self {
        Configuration {
            version: default_schema_version(),
            language: Some(language),
            ..Default::default()
        }
    }

    /// The configured grouping policy, failing when it is unset.
    pub fn grouping_policy(&self) -> Result<GroupingPolicy> {
        self.defaults
            .one_library_per
            .ok_or(Error::MissingGroupingPolicy { context: None })
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|lib| lib.name == name)
    }

    /// Orders libraries by name and every list field lexicographically.
    pub fn sort(&mut self) {
        self.libraries.sort_by(|a, b| a.name.cmp(&b.name));
        for library in &mut self.libraries {
            library.sort();
        }
        if let Some(rust) = self.defaults.rust.as_mut() {
            rust.package_dependencies.sort();
        }
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for library in &self.libraries {
            if library.name.is_empty() {
                return Err(Error::ConfigParse {
                    message: "library without a name".to_string(),
                    hint: Some("every entry under `libraries` needs `name`".to_string()),
                });
            }
            if !seen.insert(library.name.as_str()) {
                return Err(Error::DuplicateLibrary {
                    name: library.name.clone(),
                });
            }
            if library.api.is_some() && !library.apis.is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("library {:?} sets both `api` and `apis`", library.name),
                    hint: Some("move the single `api` into the `apis` list".to_string()),
                });
            }
        }
        Ok(())
    }

    /// Serializes the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the configuration to `path` as YAML.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

/// Parses a `librarian.yaml` document.
pub fn parse(yaml_content: &str) -> Result<Configuration> {
    if yaml_content.trim().is_empty() {
        return Ok(Configuration {
            version: default_schema_version(),
            ..Default::default()
        });
    }
    let config: Configuration = serde_yaml::from_str(yaml_content)?;
    config.validate()?;
    Ok(config)
}

/// Reads and parses a `librarian.yaml` file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
