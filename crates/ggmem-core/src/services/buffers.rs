//! Compute and output buffer sizing.

use crate::domain::{ArchitectureMetadata, RuntimeParams};
use crate::settings::{F32_BYTES, HYBRID_COMPUTE_OVERHEAD};

/// Scratch memory for one micro-batch: f32 logits plus one f32 hidden state.
///
/// `(vocab_size + embedding_dim) × micro_batch_size × 4`, scaled by
/// [`HYBRID_COMPUTE_OVERHEAD`] for hybrid models.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn compute_buffer_bytes(model: &ArchitectureMetadata, params: &RuntimeParams) -> u64 {
    let base = model
        .vocab_size
        .saturating_add(model.embedding_dim)
        .saturating_mul(params.micro_batch_size)
        .saturating_mul(F32_BYTES);
    if model.is_hybrid() {
        (base as f64 * HYBRID_COMPUTE_OVERHEAD) as u64
    } else {
        base
    }
}

/// One f32 logit per vocabulary entry.
pub const fn output_buffer_bytes(model: &ArchitectureMetadata) -> u64 {
    model.vocab_size.saturating_mul(F32_BYTES)
}
