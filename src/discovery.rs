//! # File-Tree Discovery
//!
//! Produces the inputs the resolution core treats as a snapshot of the file
//! system:
//!
//! - [`discover_apis`] walks a googleapis checkout and lists every versioned
//!   API directory, i.e. a directory under `google/` or `grafeas/` holding a
//!   `BUILD.bazel` file whose last segment is a version token.
//! - [`discover_package_versions`] reads `__version__` out of each Python
//!   package's top-level `gapic_version.py`.
//!
//! Both return sorted results so that downstream output does not depend on
//! directory iteration order.
//!
//! A segment is a version token whenever it starts with `v` and a digit, so
//! point-release directories such as `v1p1beta1` are discovered too. Libraries
//! in googleapis list those directories, and a library whose paths were not
//! all discovered can no longer be left implicit. Unversioned directories
//! (`google/longrunning`, `google/type`) are never discovered; libraries built
//! from them always list their APIs explicitly.

use crate::error::{Error, Result};
use crate::version::{api_version, is_published_version};
use glob::Pattern;
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Top-level googleapis directories that hold client APIs.
pub const API_ROOTS: [&str; 2] = ["google", "grafeas"];

const BUILD_FILE: &str = "BUILD.bazel";
const VERSION_FILE: &str = "gapic_version.py";

/// Compiles `--exclude` style glob patterns.
pub fn compile_excludes<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p.as_ref()).map_err(Error::Glob))
        .collect()
}

/// Lists API paths under `googleapis_root`, minus any matching `excludes`.
pub fn discover_apis(googleapis_root: &Path, excludes: &[Pattern]) -> Result<Vec<String>> {
    let mut apis = Vec::new();

    for root in API_ROOTS {
        let dir = googleapis_root.join(root);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != BUILD_FILE {
                continue;
            }
            let Some(api_dir) = entry.path().parent() else {
                continue;
            };
            let Some(api_path) = relative_slash_path(googleapis_root, api_dir) else {
                continue;
            };
            if api_version(&api_path).is_none() {
                continue;
            }
            if excludes.iter().any(|p| p.matches(&api_path)) {
                debug!("Excluding {}", api_path);
                continue;
            }
            apis.push(api_path);
        }
    }

    apis.sort();
    apis.dedup();
    Ok(apis)
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Finds the published version of each named Python package.
///
/// Looks under `packages/<name>/` for `gapic_version.py` files that are not
/// inside a versioned (`*_v*`) directory, takes the first in sorted path
/// order, and extracts `__version__`. Unpublished `0.0.0` versions and
/// unreadable files are skipped.
pub fn discover_package_versions<S: AsRef<str>>(
    repo_root: &Path,
    library_names: &[S],
) -> Result<BTreeMap<String, String>> {
    let mut versions = BTreeMap::new();
    let packages = repo_root.join("packages");
    if !packages.is_dir() {
        return Ok(versions);
    }
    let version_re = Regex::new(r#"__version__\s*=\s*"([^"]+)""#)?;

    for name in library_names {
        let name = name.as_ref();
        let package_dir = packages.join(name);
        if !package_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&package_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != VERSION_FILE {
                continue;
            }
            let in_versioned_dir = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|d| d.to_string_lossy().contains("_v"));
            if in_versioned_dir {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let Some(version) = version_re.captures(&content).map(|c| c[1].to_string()) else {
                continue;
            };
            if is_published_version(&version) {
                versions.insert(name.to_string(), version);
            }
            break;
        }
    }

    Ok(versions)
}
