//! Core domain types.
//!
//! # Structure
//!
//! - `model` - Caller-facing `ModelInfo`, resolved `ArchitectureMetadata`, `Topology`
//! - `runtime` - Runtime parameter input and resolved form
//! - `estimate` - `MemoryEstimate` and its presentation helpers

mod estimate;
mod model;
mod runtime;

pub use estimate::{MemoryComponent, MemoryEstimate, format_bytes};
pub use model::{ArchitectureMetadata, LayerCache, ModelInfo, Topology};
pub use runtime::{RuntimeParams, RuntimeParamsInput};
