//! Importance strategies and the fine-tuning hook.

use crate::WeightSnapshot;
use prunus_core::{PruningMask, Result, Trainable};

/// Decides, per pruning round, which weights to keep.
///
/// Implementations return a round mask with one tensor mask per snapshot
/// tensor, each matching that tensor's shape, and must not depend on any
/// state the engine does not pass in.
pub trait ImportanceStrategy {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Compute this round's keep-mask from the current weights
    fn compute_importance_mask(&self, snapshot: &WeightSnapshot) -> Result<PruningMask>;
}

impl<S: ImportanceStrategy + ?Sized> ImportanceStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute_importance_mask(&self, snapshot: &WeightSnapshot) -> Result<PruningMask> {
        (**self).compute_importance_mask(snapshot)
    }
}

/// Retraining step run between pruning rounds.
///
/// Receives the engine's pruned object and the cumulative mask, and returns
/// the tuned object. Any closure `FnMut(T, &PruningMask) -> Result<T>` is a
/// tuner.
pub trait FineTune<T: Trainable> {
    /// Retrain `object`
    fn fine_tune(&mut self, object: T, mask: &PruningMask) -> Result<T>;
}

/// Tuner that returns the object unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFineTune;

impl<T: Trainable> FineTune<T> for NoFineTune {
    fn fine_tune(&mut self, object: T, _mask: &PruningMask) -> Result<T> {
        Ok(object)
    }
}

impl<T, F> FineTune<T> for F
where
    T: Trainable,
    F: FnMut(T, &PruningMask) -> Result<T>,
{
    fn fine_tune(&mut self, object: T, mask: &PruningMask) -> Result<T> {
        self(object, mask)
    }
}
