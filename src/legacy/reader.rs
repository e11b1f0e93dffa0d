//! Loads legacy configuration files from a repository checkout.
//!
//! All paths are resolved against the roots the reader is constructed with;
//! nothing here looks at the working directory.
//!
//! `state.yaml` is required. `config.yaml` is optional but must parse when
//! present. BUILD metadata and generator input are best effort: read failures
//! are logged and the source is treated as empty.

use super::{
    bazel, BuildMetadata, GeneratorInput, LegacyConfig, LegacyInputs, LegacyState,
};
use crate::config::Language;
use crate::discovery;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory holding the legacy files, relative to the repository root.
pub const LEGACY_DIR: &str = ".librarian";
pub const STATE_FILE: &str = "state.yaml";
pub const CONFIG_FILE: &str = "config.yaml";
pub const GENERATOR_INPUT_FILE: &str = "generator-input/repo-config.yaml";

/// Reads every legacy source of one repository.
#[derive(Debug, Clone)]
pub struct LegacyReader {
    repo_root: PathBuf,
    googleapis_root: Option<PathBuf>,
}

impl LegacyReader {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        LegacyReader {
            repo_root: repo_root.into(),
            googleapis_root: None,
        }
    }

    /// Enables BUILD.bazel metadata extraction from a googleapis checkout.
    pub fn with_googleapis(mut self, googleapis_root: impl Into<PathBuf>) -> Self {
        self.googleapis_root = Some(googleapis_root.into());
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn legacy_path(&self, file: &str) -> PathBuf {
        self.repo_root.join(LEGACY_DIR).join(file)
    }

    /// Reads all sources for a repository of `language`.
    pub fn read_all(&self, language: Language) -> Result<LegacyInputs> {
        let state = self.read_state()?;
        info!("Found {} libraries in {}", state.libraries.len(), STATE_FILE);

        let config = self.read_config()?;
        let build = self.read_build_metadata(&state, language);

        let generator_input = if language == Language::Go {
            self.read_generator_input().unwrap_or_else(|e| {
                warn!("Ignoring generator input: {}", e);
                GeneratorInput::default()
            })
        } else {
            GeneratorInput::default()
        };

        let package_versions = if language == Language::Python {
            let ids: Vec<&str> = state.libraries.iter().map(|l| l.id.as_str()).collect();
            discovery::discover_package_versions(&self.repo_root, &ids)?
        } else {
            Default::default()
        };

        Ok(LegacyInputs {
            state,
            config,
            build,
            generator_input,
            package_versions,
        })
    }

    /// Reads `.librarian/state.yaml`.
    pub fn read_state(&self) -> Result<LegacyState> {
        let path = self.legacy_path(STATE_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::LegacyInput {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        let state: LegacyState = parse_yaml(&path, &content)?;
        if let Some(pos) = state.libraries.iter().position(|l| l.id.is_empty()) {
            return Err(Error::LegacyInput {
                source_name: path.display().to_string(),
                message: format!("library #{} has no id", pos + 1),
            });
        }
        Ok(state)
    }

    /// Reads `.librarian/config.yaml`, or an empty config when it is absent.
    pub fn read_config(&self) -> Result<LegacyConfig> {
        let path = self.legacy_path(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_yaml(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {} at {}", CONFIG_FILE, path.display());
                Ok(LegacyConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads `.librarian/generator-input/repo-config.yaml`, or an empty input
    /// when it is absent.
    pub fn read_generator_input(&self) -> Result<GeneratorInput> {
        let path = self.legacy_path(GENERATOR_INPUT_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_yaml(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GeneratorInput::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the GAPIC rule of each library's first API directory.
    ///
    /// Without a googleapis root the result is empty. Unreadable files are
    /// skipped with a warning.
    pub fn read_build_metadata(&self, state: &LegacyState, language: Language) -> BuildMetadata {
        let mut metadata = BuildMetadata::default();
        let Some(googleapis) = self.googleapis_root.as_ref() else {
            return metadata;
        };
        if bazel::gapic_rule(language).is_none() {
            return metadata;
        }

        for library in &state.libraries {
            let Some(first_api) = library.api_paths().next() else {
                continue;
            };
            let build_path = googleapis.join(first_api).join("BUILD.bazel");
            let parsed = std::fs::read_to_string(&build_path)
                .map_err(Error::from)
                .and_then(|content| bazel::parse_build_file(&content, language));
            match parsed {
                Ok(build) => {
                    metadata.libraries.insert(library.id.clone(), build);
                }
                Err(e) => warn!("Failed to read {}: {}", build_path.display(), e),
            }
        }
        metadata
    }
}

fn parse_yaml<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    serde_yaml::from_str(content).map_err(|e| Error::LegacyInput {
        source_name: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const STATE: &str = r#"
libraries:
  - id: google-cloud-vision
    apis:
      - path: google/cloud/vision/v1
"#;

    #[test]
    fn test_missing_state_is_an_error() {
        let repo = TempDir::new().unwrap();
        let err = LegacyReader::new(repo.path()).read_state().unwrap_err();
        assert!(matches!(err, Error::LegacyInput { .. }));
    }

    #[test]
    fn test_state_library_without_id() {
        let repo = TempDir::new().unwrap();
        write(repo.path(), ".librarian/state.yaml", "libraries:\n  - id: \"\"\n");
        let err = LegacyReader::new(repo.path()).read_state().unwrap_err();
        assert!(err.to_string().contains("has no id"));
    }

    #[test]
    fn test_missing_config_is_empty() {
        let repo = TempDir::new().unwrap();
        let config = LegacyReader::new(repo.path()).read_config().unwrap();
        assert_eq!(config, LegacyConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let repo = TempDir::new().unwrap();
        write(repo.path(), ".librarian/config.yaml", "libraries: {not: [a list}\n");
        assert!(LegacyReader::new(repo.path()).read_config().is_err());
    }

    #[test]
    fn test_build_metadata_from_first_api() {
        let repo = TempDir::new().unwrap();
        let googleapis = TempDir::new().unwrap();
        write(repo.path(), ".librarian/state.yaml", STATE);
        write(
            googleapis.path(),
            "google/cloud/vision/v1/BUILD.bazel",
            "py_gapic_library(\n    name = \"v\",\n    transport = \"grpc\",\n)\n",
        );

        let reader = LegacyReader::new(repo.path()).with_googleapis(googleapis.path());
        let state = reader.read_state().unwrap();
        let build = reader.read_build_metadata(&state, Language::Python);
        assert_eq!(
            build.libraries["google-cloud-vision"].transport.as_deref(),
            Some("grpc")
        );
    }

    #[test]
    fn test_build_metadata_skips_missing_files() {
        let repo = TempDir::new().unwrap();
        let googleapis = TempDir::new().unwrap();
        write(repo.path(), ".librarian/state.yaml", STATE);

        let reader = LegacyReader::new(repo.path()).with_googleapis(googleapis.path());
        let state = reader.read_state().unwrap();
        assert!(reader
            .read_build_metadata(&state, Language::Python)
            .libraries
            .is_empty());
    }

    #[test]
    fn test_read_all_go_reads_generator_input() {
        let repo = TempDir::new().unwrap();
        write(repo.path(), ".librarian/state.yaml", STATE);
        write(
            repo.path(),
            ".librarian/generator-input/repo-config.yaml",
            "modules:\n  - name: google-cloud-vision\n    module_path_version: v2\n",
        );

        let inputs = LegacyReader::new(repo.path()).read_all(Language::Go).unwrap();
        assert_eq!(inputs.generator_input.modules.len(), 1);
        assert!(inputs.build.libraries.is_empty());

        let inputs = LegacyReader::new(repo.path())
            .read_all(Language::Python)
            .unwrap();
        assert!(inputs.generator_input.modules.is_empty());
    }
}
