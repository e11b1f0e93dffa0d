//! Phase 2: Deduplication
//!
//! Strips library fields that repeat the repository defaults and empties that
//! carry no information, so that the emitted YAML only states what differs.
//! [`inherit_defaults`] is the inverse for the inherited fields: applied to a
//! deduplicated library it restores every value this phase removed.

use crate::config::{Configuration, Defaults, Library};

/// Deduplicates every library of `config` in place.
pub fn execute(config: &mut Configuration) {
    let defaults = config.defaults.clone();
    for library in &mut config.libraries {
        deduplicate_library(library, &defaults);
    }
}

/// Deduplicates one library against `defaults`.
pub fn deduplicate_library(library: &mut Library, defaults: &Defaults) {
    clear_if_default(&mut library.transport, &defaults.transport);
    clear_if_default(&mut library.rest_numeric_enums, &defaults.rest_numeric_enums);
    clear_if_default(&mut library.release_level, &defaults.release_level);

    collapse_apis(library);

    if library.generate.as_ref().is_some_and(|g| !g.disabled) {
        library.generate = None;
    }
    if library.release.as_ref().is_some_and(|r| !r.disabled) {
        library.release = None;
    }
    if library.python.as_ref().is_some_and(|p| p.is_empty()) {
        library.python = None;
    }
    if library.go.as_ref().is_some_and(|g| g.is_empty()) {
        library.go = None;
    }
    if library.rust.as_ref().is_some_and(|r| r.is_empty()) {
        library.rust = None;
    }
}

fn clear_if_default<T: PartialEq>(value: &mut Option<T>, default: &Option<T>) {
    if default.is_some() && value == default {
        *value = None;
    }
}

/// Rewrites a one-element `apis` list as `api`.
pub fn collapse_apis(library: &mut Library) {
    let paths: Vec<String> = library.api_paths().into_iter().map(str::to_string).collect();
    match paths.as_slice() {
        [single] => {
            library.api = Some(single.clone());
            library.apis.clear();
        }
        _ => {
            library.api = None;
            library.apis = paths;
        }
    }
}

/// Fills unset inheritable fields of `library` from `defaults`.
pub fn inherit_defaults(library: &Library, defaults: &Defaults) -> Library {
    let mut effective = library.clone();
    if effective.transport.is_none() {
        effective.transport = defaults.transport.clone();
    }
    if effective.rest_numeric_enums.is_none() {
        effective.rest_numeric_enums = defaults.rest_numeric_enums;
    }
    if effective.release_level.is_none() {
        effective.release_level = defaults.release_level.clone();
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoModule, LibraryGenerate, LibraryRelease, PythonPackage, RustCrate};

    fn defaults() -> Defaults {
        Defaults {
            transport: Some("grpc+rest".to_string()),
            rest_numeric_enums: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_clears_values_equal_to_defaults() {
        let mut lib = Library::named("a");
        lib.transport = Some("grpc+rest".to_string());
        lib.rest_numeric_enums = Some(true);
        lib.release_level = Some("preview".to_string());
        deduplicate_library(&mut lib, &defaults());
        assert_eq!(lib.transport, None);
        assert_eq!(lib.rest_numeric_enums, None);
        assert_eq!(lib.release_level.as_deref(), Some("preview"));
    }

    #[test]
    fn test_keeps_values_that_differ() {
        let mut lib = Library::named("a");
        lib.transport = Some("grpc".to_string());
        lib.rest_numeric_enums = Some(false);
        deduplicate_library(&mut lib, &defaults());
        assert_eq!(lib.transport.as_deref(), Some("grpc"));
        assert_eq!(lib.rest_numeric_enums, Some(false));
    }

    #[test]
    fn test_no_default_keeps_value() {
        let mut lib = Library::named("a");
        lib.transport = Some("grpc".to_string());
        deduplicate_library(&mut lib, &Defaults::default());
        assert_eq!(lib.transport.as_deref(), Some("grpc"));
    }

    #[test]
    fn test_collapses_single_api() {
        let mut lib = Library::named("a");
        lib.set_api_paths(["google/cloud/a/v1"]);
        deduplicate_library(&mut lib, &defaults());
        assert_eq!(lib.api.as_deref(), Some("google/cloud/a/v1"));
        assert!(lib.apis.is_empty());
        assert_eq!(lib.api_paths(), vec!["google/cloud/a/v1"]);
    }

    #[test]
    fn test_keeps_multiple_apis() {
        let mut lib = Library::named("a");
        lib.set_api_paths(["google/cloud/a/v1", "google/cloud/a/v2"]);
        deduplicate_library(&mut lib, &defaults());
        assert_eq!(lib.api, None);
        assert_eq!(lib.apis.len(), 2);
    }

    #[test]
    fn test_removes_empty_blocks() {
        let mut lib = Library::named("a");
        lib.python = Some(PythonPackage::default());
        lib.go = Some(GoModule::default());
        lib.rust = Some(RustCrate::default());
        lib.generate = Some(LibraryGenerate { disabled: false });
        lib.release = Some(LibraryRelease { disabled: true });
        deduplicate_library(&mut lib, &defaults());
        assert!(lib.python.is_none());
        assert!(lib.go.is_none());
        assert!(lib.rust.is_none());
        assert!(lib.generate.is_none());
        assert_eq!(lib.release, Some(LibraryRelease { disabled: true }));
    }

    #[test]
    fn test_inherit_defaults_restores_cleared_values() {
        let mut lib = Library::named("a");
        lib.transport = Some("grpc+rest".to_string());
        lib.rest_numeric_enums = Some(true);
        let original = lib.clone();
        deduplicate_library(&mut lib, &defaults());
        let restored = inherit_defaults(&lib, &defaults());
        assert_eq!(restored.transport, original.transport);
        assert_eq!(restored.rest_numeric_enums, original.rest_numeric_enums);
    }

    #[test]
    fn test_execute_is_idempotent() {
        let mut config = Configuration {
            defaults: defaults(),
            libraries: vec![{
                let mut lib = Library::named("a");
                lib.transport = Some("grpc+rest".to_string());
                lib.set_api_paths(["x/v1"]);
                lib
            }],
            ..Default::default()
        };
        execute(&mut config);
        let once = config.clone();
        execute(&mut config);
        assert_eq!(config, once);
    }
}
