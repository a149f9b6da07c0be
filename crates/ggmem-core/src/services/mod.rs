//! Estimation pipeline.
//!
//! `normalizer` resolves inputs, `kv_cache` and `buffers` compute the
//! individual components, `estimator` ties them together.

mod buffers;
mod estimator;
mod kv_cache;
mod normalizer;

pub use buffers::{compute_buffer_bytes, output_buffer_bytes};
pub use estimator::{Estimator, estimate_memory};
pub use kv_cache::{CacheElementSizes, cell_bytes, kv_cache_bytes};
pub use normalizer::{alternating_swa_pattern, normalize_model, normalize_runtime};
