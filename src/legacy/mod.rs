//! # Legacy Configuration Inputs
//!
//! Before `librarian.yaml`, a repository's generation settings were spread
//! over several files. This module models each of them as plain structs and
//! provides [`reader::LegacyReader`] to load them from an explicit repository
//! root.
//!
//! ## Sources
//!
//! - **State** (`.librarian/state.yaml`): the authoritative list of libraries
//!   with their APIs, preserved-file patterns and tag formats.
//! - **Overrides** (`.librarian/config.yaml`): per-library generate/release
//!   blocks.
//! - **Build metadata**: fields lifted out of googleapis `BUILD.bazel` GAPIC
//!   rules (see [`bazel`]).
//! - **Generator input** (`.librarian/generator-input/repo-config.yaml`): the
//!   Go module map.
//!
//! Any of these may be partial. Missing entries are not errors; the merge
//! leaves the corresponding fields unset.

pub mod bazel;
pub mod reader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use bazel::BuildLibrary;
pub use reader::LegacyReader;

/// `.librarian/state.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyState {
    /// Generator container image reference.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub libraries: Vec<LegacyStateLibrary>,
}

/// One library in `state.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyStateLibrary {
    pub id: String,

    /// Last released version.
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub last_generated_commit: Option<String>,

    #[serde(default)]
    pub apis: Vec<LegacyApi>,

    #[serde(default)]
    pub source_roots: Vec<String>,

    /// Patterns of files regeneration must not touch.
    #[serde(default)]
    pub preserve_regex: Vec<String>,

    #[serde(default)]
    pub remove_regex: Vec<String>,

    #[serde(default)]
    pub release_exclude_paths: Vec<String>,

    /// Release tag template using `{id}` and `{version}`.
    #[serde(default)]
    pub tag_format: Option<String>,
}

impl LegacyStateLibrary {
    pub fn api_paths(&self) -> impl Iterator<Item = &str> {
        self.apis.iter().map(|api| api.path.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyApi {
    pub path: String,

    #[serde(default)]
    pub service_config: Option<String>,
}

/// `.librarian/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyConfig {
    #[serde(default)]
    pub global_files_allowlist: Vec<GlobalFile>,

    #[serde(default)]
    pub libraries: Vec<LegacyConfigLibrary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalFile {
    pub path: String,
    #[serde(default)]
    pub permissions: Option<String>,
}

/// Per-library overrides in `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyConfigLibrary {
    pub id: String,

    #[serde(default)]
    pub next_version: Option<String>,

    #[serde(default)]
    pub generate_blocked: bool,

    #[serde(default)]
    pub release_blocked: bool,
}

/// Build metadata keyed by library ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildMetadata {
    pub libraries: BTreeMap<String, BuildLibrary>,
}

/// `.librarian/generator-input/repo-config.yaml` (Go only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorInput {
    #[serde(default)]
    pub modules: Vec<GeneratorModule>,
}

impl GeneratorInput {
    pub fn module(&self, name: &str) -> Option<&GeneratorModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorModule {
    pub name: String,

    #[serde(default)]
    pub module_path_version: Option<String>,

    #[serde(default)]
    pub apis: Vec<GeneratorModuleApi>,

    #[serde(default)]
    pub delete_generation_output_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorModuleApi {
    pub path: String,

    #[serde(default)]
    pub client_directory: Option<String>,

    #[serde(default)]
    pub disable_gapic: bool,

    #[serde(default)]
    pub proto_package: Option<String>,

    #[serde(default)]
    pub nested_protos: Vec<String>,
}

/// Everything read from a legacy repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyInputs {
    pub state: LegacyState,
    pub config: LegacyConfig,
    pub build: BuildMetadata,
    pub generator_input: GeneratorInput,
    /// Package versions found in the repository tree, keyed by library name.
    pub package_versions: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_yaml() {
        let yaml = r#"
image: us-central1-docker.pkg.dev/generator:latest
libraries:
  - id: google-cloud-secret-manager
    version: 2.21.0
    last_generated_commit: abc123
    apis:
      - path: google/cloud/secretmanager/v1
        service_config: secretmanager_v1.yaml
      - path: google/cloud/secretmanager/v1beta2
    source_roots:
      - packages/google-cloud-secret-manager
    preserve_regex:
      - packages/google-cloud-secret-manager/CHANGELOG.md
    tag_format: "{id}-v{version}"
"#;
        let state: LegacyState = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(state.libraries.len(), 1);
        let lib = &state.libraries[0];
        assert_eq!(lib.id, "google-cloud-secret-manager");
        assert_eq!(lib.version.as_deref(), Some("2.21.0"));
        assert_eq!(
            lib.api_paths().collect::<Vec<_>>(),
            vec!["google/cloud/secretmanager/v1", "google/cloud/secretmanager/v1beta2"]
        );
        assert_eq!(lib.tag_format.as_deref(), Some("{id}-v{version}"));
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
global_files_allowlist:
  - path: noxfile.py
    permissions: read-write
libraries:
  - id: google-cloud-a
    generate_blocked: true
  - id: google-cloud-b
    release_blocked: true
"#;
        let config: LegacyConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.libraries[0].generate_blocked);
        assert!(!config.libraries[0].release_blocked);
        assert!(config.libraries[1].release_blocked);
    }

    #[test]
    fn test_parse_repo_config_yaml() {
        let yaml = r#"
modules:
  - name: bigquery
    module_path_version: v2
    delete_generation_output_paths:
      - bigquery/internal
    apis:
      - path: google/cloud/bigquery/storage/v1
        client_directory: storage/apiv1
        disable_gapic: true
"#;
        let input: GeneratorInput = serde_yaml::from_str(yaml).unwrap();
        let module = input.module("bigquery").unwrap();
        assert_eq!(module.module_path_version.as_deref(), Some("v2"));
        assert!(module.apis[0].disable_gapic);
        assert!(input.module("storage").is_none());
    }
}
