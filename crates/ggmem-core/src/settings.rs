//! Estimator defaults and lookup tables.
//!
//! Holds the constants applied when optional inputs are absent and the two
//! read-only tables the estimator consults: bytes-per-element for cache
//! precisions and default vocabulary sizes per architecture. Tables are
//! plain serde types so callers can replace them from JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default micro-batch size (tokens per compute step).
pub const DEFAULT_MICRO_BATCH_SIZE: u64 = 512;

/// Default key/value cache precision tag.
pub const DEFAULT_CACHE_TYPE: &str = "f16";

/// Architecture assumed when the metadata does not name one.
pub const DEFAULT_ARCHITECTURE: &str = "llama";

/// Vocabulary size used when neither metadata nor the table supply one.
pub const FALLBACK_VOCAB_SIZE: u64 = 128_000;

/// Bytes per element assumed for precision tags missing from the table.
pub const UNKNOWN_DTYPE_BYTES: f64 = 2.0;

/// Width in bytes of one full-precision activation or logit.
pub const F32_BYTES: u64 = 4;

/// Flat compute-buffer multiplier for hybrid models.
///
/// Approximates recurrent/state-space scratch buffers; it is not derived
/// from per-layer state sizes.
pub const HYBRID_COMPUTE_OVERHEAD: f64 = 1.15;

/// Built-in bytes-per-element table, following ggml block layouts.
///
/// Block-quantized entries are `block_bytes / block_elements`.
pub const DEFAULT_DTYPE_SIZES: [(&str, f64); 15] = [
    ("f32", 4.0),
    ("f16", 2.0),
    ("bf16", 2.0),
    ("q8_0", 34.0 / 32.0),
    ("q4_0", 18.0 / 32.0),
    ("q4_1", 20.0 / 32.0),
    ("q5_0", 22.0 / 32.0),
    ("q5_1", 24.0 / 32.0),
    ("q4_k", 144.0 / 256.0),
    ("q5_k", 176.0 / 256.0),
    ("q6_k", 210.0 / 256.0),
    ("iq4_nl", 18.0 / 32.0),
    ("iq3_m", 0.406_25),
    ("iq2_m", 0.312_5),
    ("iq1_m", 0.218_75),
];

/// Built-in vocabulary sizes for architectures whose headers often omit it.
pub const DEFAULT_ARCH_VOCAB: [(&str, u64); 8] = [
    ("llama", 128_256),
    ("gemma2", 256_000),
    ("gemma3n", 262_144),
    ("qwen2", 151_936),
    ("qwen3", 151_936),
    ("lfm2", 65_536),
    ("phi3", 32_064),
    ("mistral", 32_000),
];

static BUILTIN_TABLES: LazyLock<EstimatorTables> = LazyLock::new(EstimatorTables::default);

/// Lookup tables injected into the estimator.
///
/// Missing sections in a JSON document fall back to the built-in tables.
/// A section that is present replaces the built-in one entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorTables {
    /// Lowercase precision tag to bytes per element.
    pub dtype_sizes: BTreeMap<String, f64>,
    /// Architecture name to default vocabulary size.
    pub vocab_defaults: BTreeMap<String, u64>,
}

impl Default for EstimatorTables {
    fn default() -> Self {
        Self {
            dtype_sizes: DEFAULT_DTYPE_SIZES
                .iter()
                .map(|(tag, size)| ((*tag).to_string(), *size))
                .collect(),
            vocab_defaults: DEFAULT_ARCH_VOCAB
                .iter()
                .map(|(arch, vocab)| ((*arch).to_string(), *vocab))
                .collect(),
        }
    }
}

impl EstimatorTables {
    /// Shared built-in tables, initialized once per process.
    pub fn builtin() -> &'static Self {
        &BUILTIN_TABLES
    }

    /// Parse tables from a JSON document and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            dtypes = tables.dtype_sizes.len(),
            architectures = tables.vocab_defaults.len(),
            "Loaded estimator tables"
        );
        Ok(tables)
    }

    /// Reject sizes that are not finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (dtype, &value) in &self.dtype_sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDtypeSize {
                    dtype: dtype.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Bytes per element for a precision tag (case-insensitive).
    ///
    /// Unknown tags are treated as half precision.
    pub fn bytes_per_element(&self, dtype: &str) -> f64 {
        self.dtype_sizes
            .get(&dtype.to_lowercase())
            .copied()
            .unwrap_or(UNKNOWN_DTYPE_BYTES)
    }

    /// Default vocabulary size for an architecture, or the fallback sentinel.
    pub fn default_vocab(&self, architecture: &str) -> u64 {
        self.vocab_defaults
            .get(architecture)
            .copied()
            .unwrap_or(FALLBACK_VOCAB_SIZE)
    }
}
