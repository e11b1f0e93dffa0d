//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixture repositories and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::python();
//!     fixture.command().arg("migrate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::fixtures;
    pub use super::TestFixture;
}

/// File contents of the fixture repositories.
#[allow(dead_code)]
pub mod fixtures {
    /// Repository directory name; the language is detected from it.
    pub const PYTHON_REPO: &str = "google-cloud-python";

    pub const PYTHON_STATE: &str = r#"image: us-central1-docker.pkg.dev/python-librarian-generator:latest
libraries:
  - id: google-cloud-vision
    version: 3.7.0
    apis:
      - path: google/cloud/vision/v1
      - path: google/cloud/vision/v1p1beta1
    preserve_regex:
      - packages/google-cloud-vision/CHANGELOG.md
    tag_format: '{id}-v{version}'
  - id: google-cloud-bundle
    version: 0.3.0
    apis:
      - path: google/cloud/a/v1
      - path: google/cloud/b/v1
  - id: cloud-tasks
    version: 1.0.0
    apis:
      - path: google/cloud/tasks/v2
    tag_format: '{id}-v{version}'
  - id: google-cloud-speech
    version: 2.0.0
    apis:
      - path: google/cloud/speech/v1
    preserve_regex:
      - docs/custom.rst
  - id: google-cloud-translate
    version: 3.1.0
    apis:
      - path: google/cloud/translate/v3
"#;

    pub const PYTHON_CONFIG: &str = r#"libraries:
  - id: google-cloud-bundle
    release_blocked: true
"#;

    pub const VISION_VERSION: &str = "__version__ = \"3.8.0\"  # {x-release-please-version}\n";

    /// A BUILD file with a Python GAPIC rule using `transport`.
    pub fn py_build(transport: &str) -> String {
        format!(
            "py_gapic_library(\n    name = \"gapic\",\n    rest_numeric_enums = True,\n    transport = \"{}\",\n)\n",
            transport
        )
    }

    /// googleapis API directories and their BUILD transport, if any.
    pub const GOOGLEAPIS: [(&str, Option<&str>); 8] = [
        ("google/cloud/a/v1", Some("grpc")),
        ("google/cloud/b/v1", Some("grpc")),
        ("google/cloud/orphan/v1", Some("grpc+rest")),
        ("google/cloud/speech/v1", Some("grpc+rest")),
        ("google/cloud/tasks/v2", Some("grpc+rest")),
        ("google/cloud/translate/v3", Some("grpc+rest")),
        ("google/cloud/vision/v1", Some("grpc+rest")),
        ("google/cloud/vision/v1p1beta1", None),
    ];

    /// Expected `migrate` output for the Python fixture.
    pub const PYTHON_MIGRATED: &str = r#"version: v1
language: python
defaults:
  output: packages/{name}/
  one_library_per: service
  transport: grpc+rest
  rest_numeric_enums: true
  tag_format: '{name}-v{version}'
name_overrides:
  google-cloud-tasks: cloud-tasks
versions:
  cloud-tasks: 1.0.0
  google-cloud-bundle: 0.3.0
  google-cloud-speech: 2.0.0
  google-cloud-translate: 3.1.0
  google-cloud-vision: 3.8.0
libraries:
- name: google-cloud-bundle
  apis:
  - google/cloud/a/v1
  - google/cloud/b/v1
  transport: grpc
  release:
    disabled: true
- name: google-cloud-speech
  keep:
  - docs/custom.rst
"#;

    pub const SIDEKICK_ROOT: &str = r#"[general]
language = "rust"

[codec]
disabled-rustdoc-warnings = "redundant_explicit_links"
"package:wkt" = "package=google-cloud-wkt,source=google.protobuf"

[release]
remote = "upstream"
branch = "main"
"#;
}

/// A repository checkout plus a googleapis checkout in one temp directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    repo: PathBuf,
}

#[allow(dead_code)]
impl TestFixture {
    /// Empty fixture whose repository directory is `repo_name`.
    pub fn new(repo_name: &str) -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let repo = temp_dir.path().join(repo_name);
        std::fs::create_dir_all(&repo).expect("Failed to create repository directory");
        std::fs::create_dir_all(temp_dir.path().join("googleapis"))
            .expect("Failed to create googleapis directory");
        Self { temp_dir, repo }
    }

    /// The Python repository with legacy `.librarian/` files and a
    /// matching googleapis tree.
    pub fn python() -> Self {
        let mut fixture = Self::new(fixtures::PYTHON_REPO)
            .with_repo_file(".librarian/state.yaml", fixtures::PYTHON_STATE)
            .with_repo_file(".librarian/config.yaml", fixtures::PYTHON_CONFIG)
            .with_repo_file(
                "packages/google-cloud-vision/google/cloud/vision/gapic_version.py",
                fixtures::VISION_VERSION,
            );
        for (api, transport) in fixtures::GOOGLEAPIS {
            let build = transport.map(fixtures::py_build).unwrap_or_default();
            fixture = fixture.with_api(api, &build);
        }
        fixture.with_api_file("google/type/BUILD.bazel", "")
    }

    /// Add a file under the repository directory.
    pub fn with_repo_file(self, path: &str, content: &str) -> Self {
        std::fs::create_dir_all(self.repo.join(path).parent().expect("file has a parent"))
            .expect("Failed to create directory");
        std::fs::write(self.repo.join(path), content).expect("Failed to write file");
        self
    }

    /// Add an API directory with the given BUILD.bazel content.
    pub fn with_api(self, api_path: &str, build: &str) -> Self {
        self.with_api_file(&format!("{}/BUILD.bazel", api_path), build)
    }

    /// Add a file under the googleapis directory.
    pub fn with_api_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("googleapis")
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn googleapis(&self) -> PathBuf {
        self.temp_dir.path().join("googleapis")
    }

    /// Create a command with no repository-related environment leaking in.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("librarian-migrate");
        cmd.current_dir(self.temp_dir.path())
            .env_remove("LIBRARIAN_REPO")
            .env_remove("LIBRARIAN_GOOGLEAPIS")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_fixture_layout() {
        let fixture = TestFixture::python();
        assert!(fixture.repo().join(".librarian/state.yaml").exists());
        assert!(fixture
            .googleapis()
            .join("google/cloud/vision/v1p1beta1/BUILD.bazel")
            .exists());
    }

    #[test]
    fn test_fixture_yaml_is_valid() {
        for yaml in [
            fixtures::PYTHON_STATE,
            fixtures::PYTHON_CONFIG,
            fixtures::PYTHON_MIGRATED,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(yaml).expect("fixture should be valid YAML");
        }
    }
}
