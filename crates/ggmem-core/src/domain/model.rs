//! Model architecture types.
//!
//! `ModelInfo` is the loose, caller-facing mapping of architecture fields.
//! `ArchitectureMetadata` is the resolved form the calculators consume:
//! defaults filled in and the cache topology decided once.

use serde::{Deserialize, Serialize};

/// Architecture fields as supplied by the caller.
///
/// Every field is optional here; normalization decides which absences are
/// errors and which get defaults. Field aliases accept the llama.cpp-style
/// short names (`n_layers`, `n_embd`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    /// Bytes occupied by the model weights.
    pub file_size: Option<u64>,
    /// Architecture identifier (e.g. "llama", "gemma2").
    pub architecture: Option<String>,
    /// Total transformer layer count.
    #[serde(alias = "n_layers", alias = "block_count")]
    pub layer_count: Option<u64>,
    /// Hidden dimension.
    #[serde(alias = "n_embd", alias = "embedding_length")]
    pub embedding_dim: Option<u64>,
    /// Attention (query) head count.
    #[serde(alias = "n_head")]
    pub head_count: Option<u64>,
    /// Key/value head count (GQA).
    #[serde(alias = "n_head_kv")]
    pub kv_head_count: Option<u64>,
    /// Output vocabulary size.
    #[serde(alias = "n_vocab")]
    pub vocab_size: Option<u64>,
    /// Per-head key dimension.
    #[serde(alias = "n_embd_head_k")]
    pub head_dim_k: Option<f64>,
    /// Per-head value dimension.
    #[serde(alias = "n_embd_head_v")]
    pub head_dim_v: Option<f64>,
    /// Sliding-window size in positions.
    pub sliding_window: Option<u64>,
    /// Per-layer flags marking windowed layers.
    #[serde(alias = "swa_pattern")]
    pub swa_layer_pattern: Option<Vec<bool>>,
    /// Per-layer key/value head counts; zero means no cache for that layer.
    #[serde(alias = "n_head_kv_per_layer")]
    pub kv_heads_per_layer: Option<Vec<u64>>,
}

/// Cache layout of one layer in a hybrid, partly windowed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCache {
    /// Key/value heads cached by this layer (zero for recurrent blocks).
    pub kv_heads: u64,
    /// Whether the layer attends through the sliding window.
    pub windowed: bool,
}

/// How the key/value cache is distributed over layers.
///
/// Resolved once during normalization; calculators match on it instead of
/// re-inspecting optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Every attention layer caches the full context with the global kv heads.
    Standard {
        /// Layers that carry a cache.
        attention_layers: u64,
    },
    /// Some layers cache at most `window` positions, the rest the full context.
    SlidingWindow {
        /// Window size; `None` when only a layer pattern was given.
        window: Option<u64>,
        windowed_layers: u64,
        full_layers: u64,
    },
    /// Per-layer kv heads, with zero-head layers caching nothing.
    Hybrid { kv_heads_per_layer: Vec<u64> },
    /// Hybrid layout whose attention layers are partly windowed.
    HybridSlidingWindow {
        window: Option<u64>,
        layers: Vec<LayerCache>,
    },
}

impl Topology {
    /// Whether some layers carry no key/value cache.
    pub const fn is_hybrid(&self) -> bool {
        matches!(self, Self::Hybrid { .. } | Self::HybridSlidingWindow { .. })
    }

    /// Whether some layers use sliding-window attention.
    pub const fn has_swa(&self) -> bool {
        matches!(
            self,
            Self::SlidingWindow { .. } | Self::HybridSlidingWindow { .. }
        )
    }

    /// Short label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::SlidingWindow { .. } => "sliding_window",
            Self::Hybrid { .. } => "hybrid",
            Self::HybridSlidingWindow { .. } => "hybrid_sliding_window",
        }
    }
}

/// Fully resolved architecture metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureMetadata {
    pub file_size: u64,
    pub architecture: String,
    pub layer_count: u64,
    pub embedding_dim: u64,
    pub head_count: u64,
    pub kv_head_count: u64,
    pub vocab_size: u64,
    pub head_dim_k: f64,
    pub head_dim_v: f64,
    /// Number of layers that carry a key/value cache.
    pub attention_layer_count: u64,
    pub topology: Topology,
}

impl ArchitectureMetadata {
    pub const fn is_hybrid(&self) -> bool {
        self.topology.is_hybrid()
    }

    pub const fn has_swa(&self) -> bool {
        self.topology.has_swa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_accepts_short_names() {
        let info: ModelInfo = serde_json::from_str(
            r#"{
                "file_size": 1000,
                "n_layers": 16,
                "n_embd": 2048,
                "n_head": 32,
                "n_head_kv": 8,
                "n_vocab": 128256,
                "swa_pattern": [true, false],
                "n_head_kv_per_layer": [0, 8]
            }"#,
        )
        .unwrap();

        assert_eq!(info.layer_count, Some(16));
        assert_eq!(info.embedding_dim, Some(2048));
        assert_eq!(info.kv_head_count, Some(8));
        assert_eq!(info.vocab_size, Some(128_256));
        assert_eq!(info.swa_layer_pattern, Some(vec![true, false]));
        assert_eq!(info.kv_heads_per_layer, Some(vec![0, 8]));
        assert!(info.head_dim_k.is_none());
    }

    #[test]
    fn test_topology_classification() {
        let standard = Topology::Standard {
            attention_layers: 4,
        };
        assert!(!standard.is_hybrid());
        assert!(!standard.has_swa());

        let hybrid_swa = Topology::HybridSlidingWindow {
            window: Some(512),
            layers: vec![LayerCache {
                kv_heads: 8,
                windowed: true,
            }],
        };
        assert!(hybrid_swa.is_hybrid());
        assert!(hybrid_swa.has_swa());
        assert_eq!(hybrid_swa.label(), "hybrid_sliding_window");
    }
}
