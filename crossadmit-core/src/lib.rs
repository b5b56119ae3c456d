//! # CrossAdmit Core
//!
//! Core library for CrossAdmit: records which universities admitted a
//! student and which one they chose, and aggregates those submissions into
//! pairwise choice statistics with 95% confidence intervals.
//!
//! The aggregation [`engine`] is a set of pure functions over a submission
//! snapshot. Around it sit the [`ingest`] validation boundary, the
//! [`store`], layered [`config`], and an HTTP [`gateway`].

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod persistence;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{CrossAdmitConfig, IngestConfig, ServerConfig, StoreConfig, config_exists};
pub use engine::{
    build_report, compute_all_comparisons, compute_comparison, compute_major_stats,
    find_comparison_by_id, list_submissions_for_pair,
};
pub use error::{CrossAdmitError, Result, StoreError, ValidationError};
pub use store::{JsonFileStore, MemoryStore, SubmissionStore};
pub use types::{
    Comparison, ComparisonReport, ConfidenceInterval, MajorBreakdown, MajorMatch, MajorStat,
    NewSubmission, PairKey, Submission, UNSPECIFIED_MAJOR,
};
