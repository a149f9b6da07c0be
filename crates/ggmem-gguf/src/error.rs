//! Error types for the GGUF metadata adapter.

use ggmem_core::EstimateError;
use thiserror::Error;

/// Errors that can occur while turning header metadata into an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// A per-layer pattern field could not be decoded.
    ///
    /// Only raised in [`PatternDecoding::Strict`](crate::PatternDecoding::Strict) mode.
    #[error("Malformed per-layer pattern in '{key}': {reason}")]
    MalformedPattern { key: String, reason: String },

    /// Normalization of the extracted fields failed.
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
