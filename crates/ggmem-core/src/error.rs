//! Error types for memory estimation.
//!
//! Failures are absent required fields or a zero head count that head
//! dimensions would be derived from, both detected during normalization,
//! and problems loading replacement lookup tables.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while normalizing estimation inputs.
///
/// Raised before any calculation runs; no partial estimate is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// A required model or runtime field was absent.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the absent field (e.g. `file_size`, `context_length`).
        field: &'static str,
    },

    /// A field was present but its value makes a derived quantity undefined.
    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl EstimateError {
    /// Shorthand for [`EstimateError::MissingField`].
    #[must_use]
    pub const fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

/// Errors that can occur while loading estimator lookup tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The table file could not be read.
    #[error("Failed to read tables from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table document is not valid JSON for `EstimatorTables`.
    #[error("Invalid table definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// A dtype entry has a size that cannot describe real storage.
    #[error("Invalid bytes-per-element for dtype '{dtype}': {value}")]
    InvalidDtypeSize { dtype: String, value: f64 },
}
