#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ArchitectureMetadata, LayerCache, MemoryComponent, MemoryEstimate, ModelInfo, RuntimeParams,
    RuntimeParamsInput, Topology, format_bytes,
};
pub use error::{ConfigError, EstimateError};
pub use services::{Estimator, estimate_memory};
pub use settings::{
    DEFAULT_CACHE_TYPE, DEFAULT_MICRO_BATCH_SIZE, EstimatorTables, FALLBACK_VOCAB_SIZE,
};
