//! Runtime parameters chosen by the caller.

use serde::{Deserialize, Serialize};

/// Runtime parameters as supplied by the caller.
///
/// Only `context_length` is required; the rest fall back to the defaults in
/// [`crate::settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeParamsInput {
    /// Context length in positions.
    #[serde(alias = "n_ctx")]
    pub context_length: Option<u64>,
    /// Tokens per compute step.
    #[serde(alias = "n_ubatch")]
    pub micro_batch_size: Option<u64>,
    /// Key cache precision tag (e.g. "f16", "q8_0").
    #[serde(alias = "type_k")]
    pub key_dtype: Option<String>,
    /// Value cache precision tag.
    #[serde(alias = "type_v")]
    pub value_dtype: Option<String>,
}

impl RuntimeParamsInput {
    /// Input with only the context length set.
    pub const fn with_context(context_length: u64) -> Self {
        Self {
            context_length: Some(context_length),
            micro_batch_size: None,
            key_dtype: None,
            value_dtype: None,
        }
    }

    /// Set the micro-batch size.
    #[must_use]
    pub fn micro_batch(mut self, micro_batch_size: u64) -> Self {
        self.micro_batch_size = Some(micro_batch_size);
        self
    }

    /// Set both cache precisions to the same tag.
    #[must_use]
    pub fn cache_type(mut self, dtype: impl Into<String>) -> Self {
        let dtype = dtype.into();
        self.key_dtype = Some(dtype.clone());
        self.value_dtype = Some(dtype);
        self
    }
}

/// Resolved runtime parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeParams {
    pub context_length: u64,
    pub micro_batch_size: u64,
    pub key_dtype: String,
    pub value_dtype: String,
}
