//! # API Version Tokens and Default API Selection
//!
//! API directories in googleapis end in a version segment such as `v1`,
//! `v2beta3` or `v1alpha`. This module parses that segment into a
//! [`VersionToken`] and defines the preference order used to pick the
//! "current" API of a library that spans several versions.
//!
//! ## Preference Order
//!
//! From most to least preferred:
//!
//! 1.  Stable versions (`v2` before `v1`).
//! 2.  Beta versions (`v2beta1` before `v1beta2` before `v1beta1`).
//! 3.  Alpha versions, ordered the same way.
//! 4.  Versions with an unrecognised suffix (e.g. `v1p1beta1`).
//! 5.  Unversioned paths.
//!
//! Paths whose version tokens compare equal are ordered by the path string,
//! so two distinct paths never compare equal and selection does not depend
//! on input order.
//!
//! The module also validates library release versions (`1.2.3`) with `semver`.

use crate::error::Result;
use semver::Version;
use std::cmp::Ordering;

/// Pre-release tier of an API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PrereleaseTier {
    /// Stable, or a pre-release suffix that is neither alpha nor beta.
    #[default]
    None = 0,
    Alpha = 1,
    Beta = 2,
}

/// Structured form of an API path's trailing version segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionToken {
    /// The digits following `v`.
    pub major: u64,
    /// True when the segment has no suffix after the major number.
    pub stable: bool,
    pub tier: PrereleaseTier,
    /// Digits after `alpha`/`beta`; 1 when the suffix carries none.
    pub prerelease_number: u64,
}

impl VersionToken {
    fn preference_key(&self) -> (bool, PrereleaseTier, u64, u64) {
        (self.stable, self.tier, self.major, self.prerelease_number)
    }
}

/// Greater means more preferred.
impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.preference_key().cmp(&other.preference_key())
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parses a version segment such as `v1beta2`.
///
/// Returns `None` for segments that do not start with `v` followed by a
/// digit. Callers treat those as unversioned, below every versioned path.
///
/// ```
/// use librarian_migrate::version::{parse_version, PrereleaseTier};
///
/// let token = parse_version("v2beta3").unwrap();
/// assert_eq!(token.major, 2);
/// assert_eq!(token.tier, PrereleaseTier::Beta);
/// assert_eq!(token.prerelease_number, 3);
/// assert!(parse_version("type").is_none());
/// ```
pub fn parse_version(segment: &str) -> Option<VersionToken> {
    let rest = segment.strip_prefix('v')?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let major = rest[..digits_end].parse::<u64>().ok()?;
    let suffix = &rest[digits_end..];

    if suffix.is_empty() {
        return Some(VersionToken {
            major,
            stable: true,
            tier: PrereleaseTier::None,
            prerelease_number: 0,
        });
    }

    let (tier, number) = if let Some(n) = suffix.strip_prefix("beta") {
        (PrereleaseTier::Beta, n)
    } else if let Some(n) = suffix.strip_prefix("alpha") {
        (PrereleaseTier::Alpha, n)
    } else {
        (PrereleaseTier::None, "")
    };

    let prerelease_number = match (tier, number) {
        (PrereleaseTier::None, _) => 0,
        (_, "") => 1,
        (_, n) if n.bytes().all(|b| b.is_ascii_digit()) => n.parse::<u64>().unwrap_or(u64::MAX),
        // beta1x and friends
        _ => {
            return Some(VersionToken {
                major,
                stable: false,
                tier: PrereleaseTier::None,
                prerelease_number: 0,
            })
        }
    };

    Some(VersionToken {
        major,
        stable: false,
        tier,
        prerelease_number,
    })
}

/// Parses the version token of an API path's last segment.
pub fn api_version(api_path: &str) -> Option<VersionToken> {
    let last = api_path.trim_end_matches('/').rsplit('/').next()?;
    parse_version(last)
}

/// Total preference order over API paths; `Less` means `a` is preferred.
///
/// Sorting a slice with this comparator puts the most preferred path first.
pub fn preference_order(a: &str, b: &str) -> Ordering {
    api_version(b)
        .cmp(&api_version(a))
        .then_with(|| a.cmp(b))
}

/// Selects the default ("current") API among a library's API paths.
///
/// Returns `None` for empty input. A single path is returned as-is; otherwise
/// the most preferred path by [`preference_order`] wins.
///
/// ```
/// use librarian_migrate::version::select_default_api;
///
/// let apis = ["google/cloud/x/v1beta1", "google/cloud/x/v1"];
/// assert_eq!(select_default_api(&apis), Some("google/cloud/x/v1"));
/// ```
pub fn select_default_api<S: AsRef<str>>(api_paths: &[S]) -> Option<&str> {
    api_paths
        .iter()
        .map(AsRef::as_ref)
        .min_by(|a, b| preference_order(a, b))
}

/// Validates a library release version, tolerating a leading `v`.
pub fn parse_release_version(version: &str) -> Result<Version> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    Ok(Version::parse(trimmed)?)
}

/// Whether a discovered release version marks a package that was actually
/// published. `0.0.0` is the placeholder written before a first release.
pub fn is_published_version(version: &str) -> bool {
    match parse_release_version(version) {
        Ok(v) => v != Version::new(0, 0, 0),
        Err(_) => !version.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stable() {
        let token = parse_version("v1").unwrap();
        assert_eq!(token.major, 1);
        assert!(token.stable);
        assert_eq!(token.tier, PrereleaseTier::None);
        assert_eq!(token.prerelease_number, 0);
    }

    #[test]
    fn test_parse_prerelease_defaults_number_to_one() {
        let beta = parse_version("v1beta").unwrap();
        assert_eq!(beta.tier, PrereleaseTier::Beta);
        assert_eq!(beta.prerelease_number, 1);
        assert_eq!(beta, parse_version("v1beta1").unwrap());

        let alpha = parse_version("v3alpha").unwrap();
        assert_eq!(alpha.tier, PrereleaseTier::Alpha);
        assert_eq!(alpha.prerelease_number, 1);
    }

    #[test]
    fn test_parse_unversioned() {
        assert!(parse_version("").is_none());
        assert!(parse_version("v").is_none());
        assert!(parse_version("vision").is_none());
        assert!(parse_version("type").is_none());
        assert!(parse_version("1").is_none());
    }

    #[test]
    fn test_parse_unrecognised_suffix() {
        let token = parse_version("v1p1beta1").unwrap();
        assert_eq!(token.major, 1);
        assert!(!token.stable);
        assert_eq!(token.tier, PrereleaseTier::None);
    }

    #[test]
    fn test_token_order() {
        let v = |s| parse_version(s).unwrap();
        assert!(v("v1") > v("v2beta1"));
        assert!(v("v2") > v("v1"));
        assert!(v("v1beta1") > v("v1alpha1"));
        assert!(v("v1beta1") > v("v9alpha9"));
        assert!(v("v2beta1") > v("v1beta2"));
        assert!(v("v1beta2") > v("v1beta1"));
        assert!(v("v1alpha1") > v("v1p1beta1"));
    }

    #[test]
    fn test_select_default_examples() {
        assert_eq!(
            select_default_api(&["google/cloud/x/v1beta1", "google/cloud/x/v1"]),
            Some("google/cloud/x/v1")
        );
        assert_eq!(
            select_default_api(&["google/cloud/x/v1alpha1", "google/cloud/x/v1beta1"]),
            Some("google/cloud/x/v1beta1")
        );
        assert_eq!(
            select_default_api(&[
                "google/cloud/x/v2",
                "google/cloud/x/v1",
                "google/cloud/x/v2beta1"
            ]),
            Some("google/cloud/x/v2")
        );
    }

    #[test]
    fn test_select_default_empty_and_single() {
        let empty: [&str; 0] = [];
        assert_eq!(select_default_api(&empty), None);
        assert_eq!(select_default_api(&["google/type"]), Some("google/type"));
    }

    #[test]
    fn test_select_default_prefers_versioned_over_unversioned() {
        assert_eq!(
            select_default_api(&["google/cloud/x", "google/cloud/x/v1alpha1"]),
            Some("google/cloud/x/v1alpha1")
        );
    }

    #[test]
    fn test_preference_order_is_total() {
        // Same version token, different services.
        let a = "google/cloud/a/v1";
        let b = "google/cloud/b/v1";
        assert_eq!(preference_order(a, b), Ordering::Less);
        assert_eq!(preference_order(b, a), Ordering::Greater);
        assert_eq!(preference_order(a, a), Ordering::Equal);
    }

    #[test]
    fn test_release_versions() {
        assert_eq!(parse_release_version("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_release_version("v0.4.0").unwrap(), Version::new(0, 4, 0));
        assert!(parse_release_version("1.2").is_err());
        assert!(is_published_version("2.21.0"));
        assert!(!is_published_version("0.0.0"));
        assert!(!is_published_version(""));
    }
}
