//! Memory estimator - normalizes inputs, runs the calculators, aggregates.

use crate::domain::{
    ArchitectureMetadata, MemoryEstimate, ModelInfo, RuntimeParams, RuntimeParamsInput,
};
use crate::error::EstimateError;
use crate::settings::EstimatorTables;

use super::buffers::{compute_buffer_bytes, output_buffer_bytes};
use super::kv_cache::kv_cache_bytes;
use super::normalizer::{normalize_model, normalize_runtime};

/// Estimates inference memory against a set of lookup tables.
///
/// Holds only a shared reference to read-only tables, so one estimator can
/// serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'t> {
    tables: &'t EstimatorTables,
}

impl Default for Estimator<'static> {
    fn default() -> Self {
        Self::new(EstimatorTables::builtin())
    }
}

impl<'t> Estimator<'t> {
    /// Create an estimator over the given tables.
    pub const fn new(tables: &'t EstimatorTables) -> Self {
        Self { tables }
    }

    /// Tables this estimator resolves dtypes and vocab defaults against.
    pub const fn tables(&self) -> &'t EstimatorTables {
        self.tables
    }

    /// Normalize the inputs and estimate memory.
    pub fn estimate(
        &self,
        info: &ModelInfo,
        runtime: &RuntimeParamsInput,
    ) -> Result<MemoryEstimate, EstimateError> {
        let model = normalize_model(info, self.tables)?;
        let params = normalize_runtime(runtime)?;
        Ok(self.estimate_resolved(&model, &params))
    }

    /// Estimate memory for already-normalized inputs.
    pub fn estimate_resolved(
        &self,
        model: &ArchitectureMetadata,
        params: &RuntimeParams,
    ) -> MemoryEstimate {
        let estimate = MemoryEstimate {
            weights: model.file_size,
            kv_cache: kv_cache_bytes(model, params, self.tables),
            compute_buffer: compute_buffer_bytes(model, params),
            output_buffer: output_buffer_bytes(model),
        };

        tracing::debug!(
            architecture = %model.architecture,
            topology = model.topology.label(),
            context_length = params.context_length,
            micro_batch_size = params.micro_batch_size,
            weights = estimate.weights,
            kv_cache = estimate.kv_cache,
            compute_buffer = estimate.compute_buffer,
            output_buffer = estimate.output_buffer,
            total = estimate.total(),
            "Estimated inference memory"
        );

        estimate
    }
}

/// Estimate memory with the built-in tables.
pub fn estimate_memory(
    info: &ModelInfo,
    runtime: &RuntimeParamsInput,
) -> Result<MemoryEstimate, EstimateError> {
    Estimator::default().estimate(info, runtime)
}
