#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod adapter;
mod error;
pub mod keys;
mod value;

// =============================================================================
// Public API: Adapter + value types (minimal surface)
// =============================================================================

pub use adapter::{GgufAdapter, PatternDecoding, estimate_from_gguf, model_info_from_gguf};
pub use error::{AdapterError, AdapterResult};
pub use value::{GgufValue, RawMetadata};

// Re-export core input types for convenience
pub use ggmem_core::{MemoryEstimate, ModelInfo, RuntimeParamsInput};
