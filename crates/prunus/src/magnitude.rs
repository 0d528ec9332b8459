//! Percentile-threshold pruning by absolute weight magnitude.
//!
//! Each round computes the `pruning_rate`-th percentile of the absolute values
//! of the *current* flattened weights and keeps exactly the weights whose
//! magnitude is strictly greater. Ties at the threshold are pruned, so the
//! realized sparsity can exceed the nominal rate when many weights share the
//! threshold value (already-zeroed weights included).

use crate::{percentile, ImportanceStrategy, PruningConfig, WeightSnapshot};
use prunus_core::{PruneError, PruningMask, Result, TensorMask};
use tracing::debug;

/// Magnitude strategy with a fixed percentile rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudePruning {
    pruning_rate: f64,
}

impl MagnitudePruning {
    /// Create a strategy; a missing rate is a configuration error.
    pub fn new(pruning_rate: Option<f64>) -> Result<Self> {
        let rate = pruning_rate.ok_or_else(|| {
            PruneError::config("Pruning rate in MagnitudePruning can not be None")
        })?;
        Self::with_rate(rate)
    }

    /// Create a strategy with the given percentile in [0, 100]
    pub fn with_rate(pruning_rate: f64) -> Result<Self> {
        let pruning_rate = crate::config::validate_rate(pruning_rate)?;
        Ok(Self { pruning_rate })
    }

    /// Create from a session config
    pub fn from_config(config: &PruningConfig) -> Result<Self> {
        Self::with_rate(config.rate()?)
    }

    /// Configured percentile
    pub fn pruning_rate(&self) -> f64 {
        self.pruning_rate
    }

    /// Magnitude threshold for the given flattened weights
    pub fn threshold(&self, flat_weights: &[f32]) -> Result<f64> {
        let magnitudes: Vec<f32> = flat_weights.iter().map(|w| w.abs()).collect();
        percentile(&magnitudes, self.pruning_rate)
    }
}

impl ImportanceStrategy for MagnitudePruning {
    fn name(&self) -> &'static str {
        "magnitude_percentile"
    }

    fn compute_importance_mask(&self, snapshot: &WeightSnapshot) -> Result<PruningMask> {
        let threshold = self.threshold(snapshot.flat_weight_array())?;

        let tensors = snapshot
            .weights()
            .iter()
            .map(|t| TensorMask::new(t.shape.clone(), t.magnitude_mask(threshold)))
            .collect::<Result<Vec<_>>>()?;
        let mask = PruningMask::from_tensors(tensors);

        debug!(
            rate = self.pruning_rate,
            threshold,
            kept = mask.num_kept(),
            total = mask.numel(),
            "Computed magnitude mask"
        );

        Ok(mask)
    }
}
