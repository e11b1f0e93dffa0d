//! # Error Handling
//!
//! This module defines the centralized error type for the migration toolkit.
//! It uses the `thiserror` library to build a single `Error` enum covering
//! every failure mode of the naming, grouping and merge pipeline, plus the
//! boundary readers that feed it.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants for the resolution core are named
//!   after the failure they describe (ambiguous ownership, duplicate library,
//!   non-invertible name, missing grouping policy, unsupported values) so that
//!   callers can branch on them instead of matching on message text.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The remaining variants wrap errors from the crates used at the boundary:
//! I/O, YAML, TOML, regex, glob patterns, semver and directory walking.

use thiserror::Error;

/// Main error type for librarian migration operations
#[derive(Error, Debug)]
pub enum Error {
    /// Two different libraries claim the same API path.
    ///
    /// Migration input is ambiguous; the pipeline never picks a winner.
    #[error("API path {api_path} is claimed by both {first:?} and {second:?}")]
    AmbiguousOwnership {
        api_path: String,
        first: String,
        second: String,
    },

    /// The same library identifier appears twice in a source that must be
    /// name-unique.
    #[error("Library {name:?} is defined more than once")]
    DuplicateLibrary { name: String },

    /// A library name cannot be turned back into an API path.
    #[error("Cannot derive an API path from {name:?} under one_library_per={policy}: {reason}")]
    NonInvertibleName {
        policy: String,
        name: String,
        reason: String,
    },

    /// The grouping policy is required but was not configured.
    #[error("one_library_per is not set{}", context.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default())]
    MissingGroupingPolicy { context: Option<String> },

    /// A grouping policy value outside the supported set.
    #[error("Unsupported one_library_per value: {value:?} (must be \"service\" or \"channel\")")]
    UnsupportedPolicy { value: String },

    /// A language value outside the supported set.
    #[error("Unsupported language: {value:?} (must be one of go, python, rust)")]
    UnsupportedLanguage { value: String },

    /// An error occurred while interpreting a `librarian.yaml` document.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A legacy input source is malformed.
    #[error("Legacy input error in {source_name}: {message}")]
    LegacyInput {
        source_name: String,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
