//! Input normalization.
//!
//! Turns caller-supplied `ModelInfo` / `RuntimeParamsInput` into fully
//! resolved values. All defaulting and topology classification happens
//! here so the calculators never look at optional fields.

use crate::domain::{
    ArchitectureMetadata, LayerCache, ModelInfo, RuntimeParams, RuntimeParamsInput, Topology,
};
use crate::error::EstimateError;
use crate::settings::{
    DEFAULT_ARCHITECTURE, DEFAULT_CACHE_TYPE, DEFAULT_MICRO_BATCH_SIZE, EstimatorTables,
};

/// Resolve architecture metadata, filling defaults and classifying topology.
///
/// `vocab_size` falls back to the architecture table, then to the sentinel;
/// it is never reported missing.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_model(
    info: &ModelInfo,
    tables: &EstimatorTables,
) -> Result<ArchitectureMetadata, EstimateError> {
    let file_size = info.file_size.ok_or(EstimateError::missing("file_size"))?;
    let layer_count = info
        .layer_count
        .ok_or(EstimateError::missing("layer_count"))?;
    let embedding_dim = info
        .embedding_dim
        .ok_or(EstimateError::missing("embedding_dim"))?;
    let head_count = info.head_count.ok_or(EstimateError::missing("head_count"))?;

    let architecture = info
        .architecture
        .clone()
        .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string());
    let vocab_size = info
        .vocab_size
        .unwrap_or_else(|| tables.default_vocab(&architecture));

    if head_count == 0 && (info.head_dim_k.is_none() || info.head_dim_v.is_none()) {
        return Err(EstimateError::InvalidField {
            field: "head_count",
            reason: "must be non-zero to derive head dimensions",
        });
    }
    // Real-valued split; uneven divisions are kept as fractions.
    let derived_head_dim = embedding_dim as f64 / head_count as f64;

    let attention_layer_count = info.kv_heads_per_layer.as_ref().map_or(layer_count, |heads| {
        heads.iter().filter(|&&kv| kv > 0).count() as u64
    });
    let topology = resolve_topology(info, layer_count, attention_layer_count);

    tracing::debug!(
        %architecture,
        layer_count,
        attention_layer_count,
        topology = topology.label(),
        "Normalized model metadata"
    );

    Ok(ArchitectureMetadata {
        file_size,
        architecture,
        layer_count,
        embedding_dim,
        head_count,
        kv_head_count: info.kv_head_count.unwrap_or(head_count),
        vocab_size,
        head_dim_k: info.head_dim_k.unwrap_or(derived_head_dim),
        head_dim_v: info.head_dim_v.unwrap_or(derived_head_dim),
        attention_layer_count,
        topology,
    })
}

/// Resolve runtime parameters, applying defaults for everything but the context.
pub fn normalize_runtime(input: &RuntimeParamsInput) -> Result<RuntimeParams, EstimateError> {
    let context_length = input
        .context_length
        .ok_or(EstimateError::missing("context_length"))?;

    Ok(RuntimeParams {
        context_length,
        micro_batch_size: input.micro_batch_size.unwrap_or(DEFAULT_MICRO_BATCH_SIZE),
        key_dtype: input
            .key_dtype
            .clone()
            .unwrap_or_else(|| DEFAULT_CACHE_TYPE.to_string()),
        value_dtype: input
            .value_dtype
            .clone()
            .unwrap_or_else(|| DEFAULT_CACHE_TYPE.to_string()),
    })
}

/// Default SWA layout when only a window size is known.
///
/// Even-indexed layers are windowed, except a trailing even layer in an
/// odd-sized stack, so exactly `layer_count / 2` layers are windowed.
pub fn alternating_swa_pattern(layer_count: u64) -> Vec<bool> {
    (0..layer_count)
        .map(|i| i % 2 == 0 && i + 1 < layer_count)
        .collect()
}

fn resolve_topology(info: &ModelInfo, layer_count: u64, attention_layer_count: u64) -> Topology {
    let hybrid_heads = info
        .kv_heads_per_layer
        .as_ref()
        .filter(|heads| heads.contains(&0));
    let has_swa = info.sliding_window.is_some() || info.swa_layer_pattern.is_some();
    let window = info.sliding_window;

    match (hybrid_heads, has_swa) {
        (Some(heads), true) => {
            let pattern = info
                .swa_layer_pattern
                .clone()
                .unwrap_or_else(|| alternating_swa_pattern(layer_count));
            tracing::debug!(
                layers = heads.len(),
                "Model has both recurrent layers and sliding-window attention"
            );
            let layers = heads
                .iter()
                .enumerate()
                .map(|(i, &kv_heads)| LayerCache {
                    kv_heads,
                    windowed: pattern.get(i).copied().unwrap_or(false),
                })
                .collect();
            Topology::HybridSlidingWindow { window, layers }
        }
        (None, true) => {
            let (windowed_layers, full_layers) = match &info.swa_layer_pattern {
                Some(pattern) => {
                    let windowed = pattern.iter().filter(|&&w| w).count() as u64;
                    (windowed, pattern.len() as u64 - windowed)
                }
                None => (layer_count / 2, layer_count - layer_count / 2),
            };
            Topology::SlidingWindow {
                window,
                windowed_layers,
                full_layers,
            }
        }
        (Some(heads), false) => Topology::Hybrid {
            kv_heads_per_layer: heads.clone(),
        },
        (None, false) => Topology::Standard {
            attention_layers: attention_layer_count,
        },
    }
}
