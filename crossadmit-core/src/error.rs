//! Error types for the CrossAdmit core.
//!
//! Uses `thiserror` for public API error types. The aggregation engine itself
//! never fails; errors only arise at the ingestion, storage, and configuration
//! boundaries.

use std::path::PathBuf;

/// Top-level error type for the CrossAdmit core library.
#[derive(Debug, thiserror::Error)]
pub enum CrossAdmitError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejections raised by the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("At least 2 admitted universities are required (got {count})")]
    TooFewUniversities { count: usize },

    #[error("Registered university '{university}' is not in the admitted list")]
    RegisteredNotAdmitted { university: String },

    #[error("Registered university is required")]
    MissingRegistered,

    #[error("University name at position {index} is blank")]
    BlankUniversity { index: usize },

    #[error("University '{university}' appears more than once")]
    DuplicateUniversity { university: String },
}

/// Errors from the submission store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `CrossAdmitError`.
pub type Result<T> = std::result::Result<T, CrossAdmitError>;
