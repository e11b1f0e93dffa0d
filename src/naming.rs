//! # Library Name Derivation
//!
//! Maps API paths such as `google/cloud/secretmanager/v1` to canonical library
//! identifiers and back, according to the repository's grouping policy.
//!
//! - **Per service** (`one_library_per: service`): every version of a service
//!   lands in one library. The trailing version segment is dropped before the
//!   remaining segments are joined with `-`:
//!   `google/cloud/secretmanager/v1` → `google-cloud-secretmanager`.
//!   The inverse is lossy and always fails.
//! - **Per channel** (`one_library_per: channel`, also spelled `version`): each
//!   API version is its own library. All segments are joined with `-`:
//!   `google/cloud/secretmanager/v1` → `google-cloud-secretmanager-v1`.
//!   The inverse splits on `-` and rejoins with `/`.
//!
//! Segment names are assumed to be free of `-`. An API directory with a hyphen
//! in one of its segments derives a name whose inverse is a different path;
//! nothing here tries to disambiguate that case.

use crate::error::{Error, Result};
use crate::version::parse_version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between path segments in a derived library name.
pub const NAME_SEPARATOR: char = '-';

/// How discovered API paths collapse into libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingPolicy {
    /// One library spans every version of a service (Python, Go).
    #[serde(alias = "api")]
    Service,
    /// One library per API version (Rust, Dart).
    #[serde(alias = "version")]
    Channel,
}

impl GroupingPolicy {
    /// The value as written in `librarian.yaml`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingPolicy::Service => "service",
            GroupingPolicy::Channel => "channel",
        }
    }
}

impl fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "service" | "api" => Ok(GroupingPolicy::Service),
            "channel" | "version" => Ok(GroupingPolicy::Channel),
            other => Err(Error::UnsupportedPolicy {
                value: other.to_string(),
            }),
        }
    }
}

/// Splits an API path into its service part and trailing version segment.
///
/// The version is only split off when the last segment parses as a version
/// token (`v` followed by a digit).
///
/// ```
/// use librarian_migrate::naming::split_version;
///
/// assert_eq!(split_version("google/cloud/vision/v1"), ("google/cloud/vision", Some("v1")));
/// assert_eq!(split_version("google/type"), ("google/type", None));
/// ```
pub fn split_version(api_path: &str) -> (&str, Option<&str>) {
    let trimmed = api_path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((service, last)) if parse_version(last).is_some() => (service, Some(last)),
        Some(_) => (trimmed, None),
        None if parse_version(trimmed).is_some() => ("", Some(trimmed)),
        None => (trimmed, None),
    }
}

/// The key that groups API paths into one library under `policy`.
///
/// Per service this is the path without its version segment; per channel it
/// is the path itself.
pub fn service_key(policy: GroupingPolicy, api_path: &str) -> &str {
    match policy {
        GroupingPolicy::Service => split_version(api_path).0,
        GroupingPolicy::Channel => api_path.trim_matches('/'),
    }
}

/// Derives the canonical library name for an API path.
///
/// ```
/// use librarian_migrate::naming::{derive_library_name, GroupingPolicy};
///
/// let path = "google/cloud/secretmanager/v1";
/// assert_eq!(derive_library_name(GroupingPolicy::Service, path), "google-cloud-secretmanager");
/// assert_eq!(derive_library_name(GroupingPolicy::Channel, path), "google-cloud-secretmanager-v1");
/// ```
pub fn derive_library_name(policy: GroupingPolicy, api_path: &str) -> String {
    service_key(policy, api_path).replace('/', &NAME_SEPARATOR.to_string())
}

/// Derives the API path a library name stands for.
///
/// Only defined for [`GroupingPolicy::Channel`]; per-service names have lost
/// their version segment and are rejected with [`Error::NonInvertibleName`].
pub fn derive_api_path(policy: GroupingPolicy, name: &str) -> Result<String> {
    let fail = |reason: &str| Error::NonInvertibleName {
        policy: policy.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match policy {
        GroupingPolicy::Service => Err(fail(
            "a per-service name does not identify a single API version",
        )),
        GroupingPolicy::Channel => {
            if name.is_empty() {
                return Err(fail("the name is empty"));
            }
            if name.contains('/') {
                return Err(fail("the name already contains '/'"));
            }
            let segments: Vec<&str> = name.split(NAME_SEPARATOR).collect();
            if segments.iter().any(|s| s.is_empty()) {
                return Err(fail("the name contains an empty segment"));
            }
            Ok(segments.join("/"))
        }
    }
}
