//! # Librarian Migration Library
//!
//! This library converts the generation configuration of Google Cloud client
//! library repositories into the single-file `librarian.yaml` schema. It is
//! used by the `librarian-migrate` command-line tool but has no dependency on
//! it: every entry point takes its inputs as values or explicit paths.
//!
//! ## Quick Example
//!
//! ```
//! use librarian_migrate::naming::GroupingPolicy;
//! use librarian_migrate::phases::grouping;
//! use std::collections::BTreeMap;
//!
//! let discovered = vec![
//!     "google/cloud/vision/v1".to_string(),
//!     "google/cloud/vision/v1p1beta1".to_string(),
//!     "google/cloud/speech/v1".to_string(),
//! ];
//! let grouping =
//!     grouping::execute(GroupingPolicy::Service, &discovered, &[], &BTreeMap::new()).unwrap();
//!
//! let vision = grouping.library("google-cloud-vision").unwrap();
//! assert_eq!(vision.api_paths.len(), 2);
//! assert!(vision.implicit_apis);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The `librarian.yaml` model. Libraries whose
//!   name and APIs follow from the grouping policy are left out; the rest are
//!   listed, with `name_overrides` and `versions` recording what cannot be
//!   derived.
//! - **Naming (`naming`, `version`)**: Derives library names from API paths
//!   under a grouping policy, and orders API versions to pick a default.
//! - **Inputs (`legacy`, `sidekick`, `discovery`)**: Readers for the formats
//!   being migrated away from, and the googleapis walk that lists every API.
//! - **Phases (`phases`)**: Merge, deduplication and grouping, chained by
//!   `phases::orchestrator`.
//!
//! ## Execution Flow
//!
//! 1.  **Read**: Load legacy state, overrides, BUILD metadata and package
//!     versions (or sidekick files), and discover API paths.
//! 2.  **Merge**: Build one library per legacy entry and infer repository
//!     defaults.
//! 3.  **Deduplicate**: Drop library values equal to a default.
//! 4.  **Group**: Assign every API path to one library and minimise the
//!     library list.
//!
//! The output is deterministic and stable: resolving it and running the
//! minimisation again yields the same document.

pub mod config;
pub mod discovery;
pub mod error;
pub mod legacy;
pub mod naming;
pub mod phases;
pub mod properties;
pub mod sidekick;
pub mod version;

mod naming_proptest;
