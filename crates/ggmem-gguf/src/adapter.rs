//! GGUF header metadata adapter.
//!
//! Maps flat `"<architecture>.<field>"` header keys onto the `ModelInfo`
//! consumed by `ggmem-core`, tolerating the stringified encodings some
//! metadata producers emit.

use ggmem_core::settings::DEFAULT_ARCHITECTURE;
use ggmem_core::{Estimator, MemoryEstimate, ModelInfo, RuntimeParamsInput};

use crate::error::{AdapterError, AdapterResult};
use crate::keys::{self, arch_key};
use crate::value::{GgufValue, RawMetadata};

/// How undecodable per-layer pattern fields are handled.
///
/// Applies to both `attention.head_count_kv` arrays and
/// `attention.sliding_window_pattern`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternDecoding {
    /// Drop the field with a warning, as if it were absent.
    #[default]
    Lenient,
    /// Fail with [`AdapterError::MalformedPattern`].
    Strict,
}

/// Converts raw GGUF header metadata into estimator input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GgufAdapter {
    decoding: PatternDecoding,
}

impl GgufAdapter {
    /// Create an adapter with lenient pattern decoding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decoding: PatternDecoding::Lenient,
        }
    }

    /// Create an adapter with the given pattern decoding mode.
    #[must_use]
    pub const fn with_decoding(decoding: PatternDecoding) -> Self {
        Self { decoding }
    }

    /// Pattern decoding mode in use.
    #[must_use]
    pub const fn decoding(&self) -> PatternDecoding {
        self.decoding
    }

    /// Extract estimator input from header metadata.
    ///
    /// `file_size` is supplied separately since it is not part of the header.
    pub fn model_info(&self, raw: &RawMetadata, file_size: u64) -> AdapterResult<ModelInfo> {
        let architecture = raw
            .get(keys::ARCHITECTURE)
            .and_then(GgufValue::as_str)
            .unwrap_or(DEFAULT_ARCHITECTURE)
            .to_string();
        let fields = ArchFields {
            raw,
            arch: &architecture,
        };

        let (kv_head_count, kv_heads_per_layer) = self.extract_kv_heads(&fields)?;
        let swa_layer_pattern = self.extract_swa_pattern(&fields)?;

        // A zero vocab size is a placeholder; fall through to the next source.
        let vocab_size = fields
            .count(keys::VOCAB_SIZE)
            .filter(|&v| v > 0)
            .or_else(|| {
                raw.get(keys::TOKENIZER_TOKENS)
                    .and_then(GgufValue::as_array)
                    .map(|tokens| tokens.len() as u64)
                    .filter(|&v| v > 0)
            });

        let info = ModelInfo {
            file_size: Some(file_size),
            layer_count: fields.count(keys::BLOCK_COUNT),
            embedding_dim: fields.count(keys::EMBEDDING_LENGTH),
            head_count: fields.count(keys::HEAD_COUNT),
            kv_head_count,
            vocab_size,
            head_dim_k: fields.real(keys::KEY_LENGTH),
            head_dim_v: fields.real(keys::VALUE_LENGTH),
            sliding_window: fields.count(keys::SLIDING_WINDOW),
            swa_layer_pattern,
            kv_heads_per_layer,
            architecture: Some(architecture),
        };

        tracing::debug!(
            architecture = info.architecture.as_deref().unwrap_or_default(),
            layer_count = ?info.layer_count,
            per_layer_kv = info.kv_heads_per_layer.is_some(),
            swa_pattern = info.swa_layer_pattern.is_some(),
            "Extracted model info from GGUF metadata"
        );

        Ok(info)
    }

    /// Extract estimator input and run the estimator on it.
    pub fn estimate(
        &self,
        raw: &RawMetadata,
        file_size: u64,
        runtime: &RuntimeParamsInput,
        estimator: &Estimator<'_>,
    ) -> AdapterResult<MemoryEstimate> {
        let info = self.model_info(raw, file_size)?;
        Ok(estimator.estimate(&info, runtime)?)
    }

    /// Scalar kv head count, or per-layer counts plus the first non-zero one.
    fn extract_kv_heads(
        &self,
        fields: &ArchFields<'_>,
    ) -> AdapterResult<(Option<u64>, Option<Vec<u64>>)> {
        let Some(value) = fields.get(keys::HEAD_COUNT_KV) else {
            return Ok((None, None));
        };

        let is_per_layer = match &value {
            GgufValue::Array(_) => true,
            GgufValue::String(s) => s.trim_start().starts_with('['),
            _ => false,
        };
        if !is_per_layer {
            return Ok((fields.numeric(keys::HEAD_COUNT_KV, value.as_u64()), None));
        }

        let key = arch_key(fields.arch, keys::HEAD_COUNT_KV);
        let per_layer = self.decode_per_layer(&key, &value, "kv head count", GgufValue::as_u64)?;
        let first_attention = per_layer
            .as_ref()
            .and_then(|heads| heads.iter().copied().find(|&h| h > 0));
        Ok((first_attention, per_layer))
    }

    fn extract_swa_pattern(&self, fields: &ArchFields<'_>) -> AdapterResult<Option<Vec<bool>>> {
        let Some(value) = fields.get(keys::SLIDING_WINDOW_PATTERN) else {
            return Ok(None);
        };
        let key = arch_key(fields.arch, keys::SLIDING_WINDOW_PATTERN);

        match &value {
            GgufValue::Array(_) | GgufValue::String(_) => {
                self.decode_per_layer(&key, &value, "layer flag", GgufValue::as_bool)
            }
            // Some architectures store a period here rather than a per-layer list.
            scalar => {
                tracing::debug!(%key, value = %scalar, "Ignoring scalar sliding window pattern");
                Ok(None)
            }
        }
    }

    /// Decode a per-layer list from a native array or a JSON-array string.
    ///
    /// Never yields a partially decoded list.
    fn decode_per_layer<T>(
        &self,
        key: &str,
        value: &GgufValue,
        element: &str,
        convert: fn(&GgufValue) -> Option<T>,
    ) -> AdapterResult<Option<Vec<T>>> {
        let decoded = match value {
            GgufValue::Array(items) => convert_items(items, element, convert),
            GgufValue::String(encoded) => decode_json_array(encoded)
                .and_then(|items| convert_items(&items, element, convert)),
            other => Err(format!("expected an array, got '{other}'")),
        };

        match decoded {
            Ok(items) => Ok(Some(items)),
            Err(reason) => match self.decoding {
                PatternDecoding::Lenient => {
                    tracing::warn!(%key, %reason, "Ignoring undecodable per-layer pattern");
                    Ok(None)
                }
                PatternDecoding::Strict => Err(AdapterError::MalformedPattern {
                    key: key.to_string(),
                    reason,
                }),
            },
        }
    }
}

/// Extract estimator input with the default (lenient) adapter.
pub fn model_info_from_gguf(raw: &RawMetadata, file_size: u64) -> AdapterResult<ModelInfo> {
    GgufAdapter::new().model_info(raw, file_size)
}

/// Estimate memory straight from header metadata with built-in tables.
pub fn estimate_from_gguf(
    raw: &RawMetadata,
    file_size: u64,
    runtime: &RuntimeParamsInput,
) -> AdapterResult<MemoryEstimate> {
    GgufAdapter::new().estimate(raw, file_size, runtime, &Estimator::default())
}

/// Architecture-scoped view over raw metadata.
struct ArchFields<'a> {
    raw: &'a RawMetadata,
    arch: &'a str,
}

impl ArchFields<'_> {
    /// Value for `<arch>.<field>`, with stringified numbers coerced.
    fn get(&self, field: &str) -> Option<GgufValue> {
        self.raw.get(&arch_key(self.arch, field)).map(GgufValue::coerce)
    }

    fn count(&self, field: &str) -> Option<u64> {
        let value = self.get(field)?;
        self.numeric(field, value.as_u64())
    }

    fn real(&self, field: &str) -> Option<f64> {
        let value = self.get(field)?;
        self.numeric(field, value.as_f64())
    }

    /// Pass through a converted value, noting present-but-unusable fields.
    fn numeric<T>(&self, field: &str, converted: Option<T>) -> Option<T> {
        if converted.is_none() {
            tracing::debug!(
                key = %arch_key(self.arch, field),
                "Ignoring non-numeric metadata value"
            );
        }
        converted
    }
}

fn convert_items<T>(
    items: &[GgufValue],
    element: &str,
    convert: fn(&GgufValue) -> Option<T>,
) -> Result<Vec<T>, String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| convert(item).ok_or_else(|| format!("entry {i} ('{item}') is not a {element}")))
        .collect()
}

fn decode_json_array(encoded: &str) -> Result<Vec<GgufValue>, String> {
    let parsed: serde_json::Value =
        serde_json::from_str(encoded).map_err(|e| format!("invalid JSON: {e}"))?;
    let serde_json::Value::Array(items) = parsed else {
        return Err("expected a JSON array".to_string());
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| json_to_value(item).ok_or_else(|| format!("entry {i} is not a scalar")))
        .collect()
}

fn json_to_value(item: &serde_json::Value) -> Option<GgufValue> {
    match item {
        serde_json::Value::Bool(b) => Some(GgufValue::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(GgufValue::U64)
            .or_else(|| n.as_i64().map(GgufValue::I64))
            .or_else(|| n.as_f64().map(GgufValue::F64)),
        serde_json::Value::String(s) => Some(GgufValue::String(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, GgufValue)]) -> RawMetadata {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn s(text: &str) -> GgufValue {
        GgufValue::String(text.to_string())
    }

    #[test]
    fn test_defaults_to_llama_keys() {
        let meta = raw(&[("llama.block_count", GgufValue::U32(16))]);
        let info = model_info_from_gguf(&meta, 10).unwrap();
        assert_eq!(info.architecture.as_deref(), Some("llama"));
        assert_eq!(info.layer_count, Some(16));
        assert_eq!(info.file_size, Some(10));
    }

    #[test]
    fn test_stringified_numbers() {
        let meta = raw(&[
            ("general.architecture", s("qwen2")),
            ("qwen2.block_count", s("28")),
            ("qwen2.attention.key_length", s("128.0")),
            ("qwen2.embedding_length", s("not-a-number")),
        ]);
        let info = model_info_from_gguf(&meta, 0).unwrap();
        assert_eq!(info.layer_count, Some(28));
        assert_eq!(info.head_dim_k, Some(128.0));
        assert_eq!(info.embedding_dim, None);
    }

    #[test]
    fn test_scalar_kv_heads() {
        let meta = raw(&[("llama.attention.head_count_kv", GgufValue::U32(8))]);
        let info = model_info_from_gguf(&meta, 0).unwrap();
        assert_eq!(info.kv_head_count, Some(8));
        assert_eq!(info.kv_heads_per_layer, None);
    }

    #[test]
    fn test_json_kv_heads_per_layer() {
        let meta = raw(&[
            ("general.architecture", s("lfm2")),
            ("lfm2.attention.head_count_kv", s("[0, 0, 8, 0, 4]")),
        ]);
        let info = model_info_from_gguf(&meta, 0).unwrap();
        assert_eq!(info.kv_heads_per_layer, Some(vec![0, 0, 8, 0, 4]));
        assert_eq!(info.kv_head_count, Some(8));
    }

    #[test]
    fn test_native_kv_heads_per_layer() {
        let meta = raw(&[(
            "llama.attention.head_count_kv",
            GgufValue::Array(vec![GgufValue::U32(0), GgufValue::U32(2)]),
        )]);
        let info = model_info_from_gguf(&meta, 0).unwrap();
        assert_eq!(info.kv_heads_per_layer, Some(vec![0, 2]));
        assert_eq!(info.kv_head_count, Some(2));
    }

    #[test]
    fn test_all_zero_per_layer_leaves_scalar_unset() {
        let meta = raw(&[("llama.attention.head_count_kv", s("[0, 0]"))]);
        let info = model_info_from_gguf(&meta, 0).unwrap();
        assert_eq!(info.kv_heads_per_layer, Some(vec![0, 0]));
        assert_eq!(info.kv_head_count, None);
    }

    #[test]
    fn test_swa_pattern_json_and_native() {
        let json = raw(&[("llama.attention.sliding_window_pattern", s("[true, false, 1]"))]);
        assert_eq!(
            model_info_from_gguf(&json, 0).unwrap().swa_layer_pattern,
            Some(vec![true, false, true])
        );

        let native = raw(&[(
            "llama.attention.sliding_window_pattern",
            GgufValue::Array(vec![GgufValue::Bool(false), GgufValue::Bool(true)]),
        )]);
        assert_eq!(
            model_info_from_gguf(&native, 0).unwrap().swa_layer_pattern,
            Some(vec![false, true])
        );
    }

    #[test]
    fn test_scalar_swa_pattern_ignored() {
        let meta = raw(&[("llama.attention.sliding_window_pattern", s("6"))]);
        let strict = GgufAdapter::with_decoding(PatternDecoding::Strict);
        assert_eq!(strict.model_info(&meta, 0).unwrap().swa_layer_pattern, None);
    }

    #[test]
    fn test_lenient_drops_malformed_patterns() {
        let meta = raw(&[
            ("llama.attention.head_count_kv", s("[0, 8,")),
            ("llama.attention.sliding_window_pattern", s("[true, \"x\"]")),
        ]);
        let info = GgufAdapter::new().model_info(&meta, 0).unwrap();
        assert_eq!(info.kv_heads_per_layer, None);
        assert_eq!(info.kv_head_count, None);
        assert_eq!(info.swa_layer_pattern, None);
    }

    #[test]
    fn test_strict_rejects_malformed_kv_heads() {
        let meta = raw(&[("llama.attention.head_count_kv", s("[0, 8,"))]);
        let result = GgufAdapter::with_decoding(PatternDecoding::Strict).model_info(&meta, 0);
        assert!(matches!(
            result,
            Err(AdapterError::MalformedPattern { ref key, .. })
                if key == "llama.attention.head_count_kv"
        ));
    }

    #[test]
    fn test_strict_rejects_bad_pattern_entry() {
        let meta = raw(&[(
            "llama.attention.sliding_window_pattern",
            GgufValue::Array(vec![GgufValue::Bool(true), s("yes")]),
        )]);
        let result = GgufAdapter::with_decoding(PatternDecoding::Strict).model_info(&meta, 0);
        let Err(AdapterError::MalformedPattern { reason, .. }) = result else {
            panic!("expected malformed pattern error");
        };
        assert!(reason.contains("entry 1"));
    }

    #[test]
    fn test_negative_kv_heads_rejected_as_pattern() {
        let meta = raw(&[("llama.attention.head_count_kv", s("[8, -1]"))]);
        let strict = GgufAdapter::with_decoding(PatternDecoding::Strict);
        assert!(strict.model_info(&meta, 0).is_err());
        assert_eq!(
            GgufAdapter::new().model_info(&meta, 0).unwrap().kv_heads_per_layer,
            None
        );
    }

    #[test]
    fn test_vocab_from_tokenizer() {
        let meta = raw(&[(
            "tokenizer.ggml.tokens",
            GgufValue::Array(vec![s("a"), s("b"), s("c")]),
        )]);
        assert_eq!(model_info_from_gguf(&meta, 0).unwrap().vocab_size, Some(3));

        let explicit = raw(&[
            ("llama.vocab_size", GgufValue::U32(32_000)),
            ("tokenizer.ggml.tokens", GgufValue::Array(vec![s("a")])),
        ]);
        assert_eq!(
            model_info_from_gguf(&explicit, 0).unwrap().vocab_size,
            Some(32_000)
        );
    }

    #[test]
    fn test_zero_vocab_size_falls_through() {
        let with_tokens = raw(&[
            ("llama.vocab_size", s("0")),
            ("tokenizer.ggml.tokens", GgufValue::Array(vec![s("a"), s("b")])),
        ]);
        assert_eq!(
            model_info_from_gguf(&with_tokens, 0).unwrap().vocab_size,
            Some(2)
        );

        let bare = raw(&[
            ("general.architecture", s("qwen2")),
            ("qwen2.vocab_size", GgufValue::U32(0)),
            ("tokenizer.ggml.tokens", GgufValue::Array(Vec::new())),
        ]);
        assert_eq!(model_info_from_gguf(&bare, 0).unwrap().vocab_size, None);
    }
}
