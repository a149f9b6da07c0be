//! Key/value cache sizing.
//!
//! One cache cell is one cached position across all kv heads of a layer,
//! key and value combined:
//!
//! ```text
//! cell = head_dim_k × kv_heads × key_bytes + head_dim_v × kv_heads × value_bytes
//! ```
//!
//! Each topology sums cells over layers and positions differently.

use crate::domain::{ArchitectureMetadata, LayerCache, RuntimeParams, Topology};
use crate::settings::EstimatorTables;

/// Bytes per element for the key and value caches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheElementSizes {
    pub key: f64,
    pub value: f64,
}

impl CacheElementSizes {
    /// Resolve both cache precisions through the dtype table.
    pub fn resolve(params: &RuntimeParams, tables: &EstimatorTables) -> Self {
        Self {
            key: tables.bytes_per_element(&params.key_dtype),
            value: tables.bytes_per_element(&params.value_dtype),
        }
    }
}

/// Bytes of one cache cell for a layer with `kv_heads` heads.
#[allow(clippy::cast_precision_loss)]
pub fn cell_bytes(model: &ArchitectureMetadata, kv_heads: u64, sizes: CacheElementSizes) -> f64 {
    let kv_heads = kv_heads as f64;
    model.head_dim_k * kv_heads * sizes.key + model.head_dim_v * kv_heads * sizes.value
}

/// Key/value cache size in bytes, floored.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn kv_cache_bytes(
    model: &ArchitectureMetadata,
    params: &RuntimeParams,
    tables: &EstimatorTables,
) -> u64 {
    let sizes = CacheElementSizes::resolve(params, tables);
    let context = params.context_length;
    let global_cell = cell_bytes(model, model.kv_head_count, sizes);

    let bytes: f64 = match &model.topology {
        Topology::Standard { attention_layers } => {
            *attention_layers as f64 * context as f64 * global_cell
        }
        Topology::SlidingWindow {
            window,
            windowed_layers,
            full_layers,
        } => {
            let windowed_cells = windowed_positions(context, *window);
            *windowed_layers as f64 * windowed_cells as f64 * global_cell
                + *full_layers as f64 * context as f64 * global_cell
        }
        Topology::Hybrid { kv_heads_per_layer } => kv_heads_per_layer
            .iter()
            .filter(|&&kv_heads| kv_heads > 0)
            .map(|&kv_heads| context as f64 * cell_bytes(model, kv_heads, sizes))
            .sum(),
        Topology::HybridSlidingWindow { window, layers } => layers
            .iter()
            .filter(|layer| layer.kv_heads > 0)
            .map(|layer| layer_bytes(model, layer, context, *window, sizes))
            .sum(),
    };

    tracing::trace!(
        topology = model.topology.label(),
        key_bytes = sizes.key,
        value_bytes = sizes.value,
        bytes,
        "Computed kv cache size"
    );

    bytes as u64
}

/// Positions cached by a windowed layer; without a window size (or with a
/// zero window, which GGUF uses for "disabled") only the context bounds it.
fn windowed_positions(context: u64, window: Option<u64>) -> u64 {
    window
        .filter(|&w| w > 0)
        .map_or(context, |w| context.min(w))
}

#[allow(clippy::cast_precision_loss)]
fn layer_bytes(
    model: &ArchitectureMetadata,
    layer: &LayerCache,
    context: u64,
    window: Option<u64>,
    sizes: CacheElementSizes,
) -> f64 {
    let positions = if layer.windowed {
        windowed_positions(context, window)
    } else {
        context
    };
    positions as f64 * cell_bytes(model, layer.kv_heads, sizes)
}
