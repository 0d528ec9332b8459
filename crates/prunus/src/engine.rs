//! Pruning engine: snapshot, cumulative mask, combine and apply.
//!
//! # Lifecycle
//!
//! ```text
//!  caller object ──clone──► engine object ──weights──► WeightSnapshot
//!                                                        │
//!                         ┌──────────────────────────────┘
//!                         ▼
//!   strategy.compute_importance_mask(snapshot) = round mask
//!                         │
//!   cumulative mask AND round mask = new cumulative mask
//!                         │
//!   snapshot weights ⊙ cumulative mask ──replace_weights──► engine object
//! ```
//!
//! A pruning round either completes entirely or leaves the engine untouched:
//! the new mask, object and snapshot are built on the side and committed
//! together.

use crate::{FineTune, ImportanceStrategy, MagnitudePruning, PruningConfig, WeightSnapshot};
use prunus_core::{check_replacement, ObjectKind, PruneError, PruningMask, Result, Trainable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Statistics for one pruning round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Round number, starting at 1
    pub round: usize,
    /// Weights pruned by this round that were kept before it
    pub newly_pruned: usize,
    /// Weights pruned so far
    pub total_pruned: usize,
    /// Total parameters
    pub total_params: usize,
    /// Cumulative sparsity after this round
    pub sparsity: f32,
}

impl RoundStats {
    fn new(round: usize, newly_pruned: usize, mask: &PruningMask) -> Self {
        Self {
            round,
            newly_pruned,
            total_pruned: mask.num_pruned(),
            total_params: mask.numel(),
            sparsity: mask.sparsity(),
        }
    }

    /// Dense size over remaining size
    pub fn compression_ratio(&self) -> f32 {
        let remaining = self.total_params.saturating_sub(self.total_pruned);
        if remaining == 0 {
            return f32::INFINITY;
        }
        self.total_params as f32 / remaining as f32
    }

    /// Estimated memory saved by dropping pruned FP32 weights
    pub fn memory_savings_bytes(&self) -> usize {
        self.total_pruned * std::mem::size_of::<f32>()
    }
}

/// Pruning session over a private clone of a trainable object.
///
/// The engine owns its clone, snapshot and cumulative mask; the caller's
/// object is never modified. `prune` takes `&mut self`, so one engine is used
/// by one caller at a time.
#[derive(Debug)]
pub struct PruningEngine<T: Trainable, S: ImportanceStrategy> {
    object: T,
    kind: ObjectKind,
    strategy: S,
    snapshot: WeightSnapshot,
    mask: PruningMask,
    label: Option<String>,
    history: Vec<RoundStats>,
}

impl<T: Trainable> PruningEngine<T, MagnitudePruning> {
    /// Magnitude-percentile engine configured by `config`.
    ///
    /// The config is validated before the object is looked at, so a missing
    /// pruning rate fails without any weight processing.
    pub fn magnitude(object: &T, config: &PruningConfig) -> Result<Self> {
        let strategy = MagnitudePruning::from_config(config)?;
        let engine = Self::new(object, strategy)?;
        Ok(match &config.label {
            Some(label) => engine.labeled(label.clone()),
            None => engine,
        })
    }
}

impl<T: Trainable, S: ImportanceStrategy> PruningEngine<T, S> {
    /// Start a pruning session.
    ///
    /// Fails with `UnsupportedObjectType` for objects of unknown kind.
    /// Layer-kind objects are accepted here but cannot be pruned yet.
    pub fn new(object: &T, strategy: S) -> Result<Self> {
        let kind = classify(object)?;

        let object = object.clone();
        let snapshot = WeightSnapshot::from_object(&object)?;
        let mask = PruningMask::all_keep(snapshot.shapes());

        debug!(
            kind = %kind,
            strategy = strategy.name(),
            tensors = snapshot.num_tensors(),
            params = snapshot.total_params(),
            "Created pruning engine"
        );

        Ok(Self {
            object,
            kind,
            strategy,
            snapshot,
            mask,
            label: None,
            history: Vec::new(),
        })
    }

    /// Attach a session label used in log events
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Run one pruning round.
    ///
    /// Returns the updated cumulative mask and the object produced by
    /// `replace_weights`. Calling this repeatedly keeps pruning: the strategy
    /// sees the already-pruned weights each time, so sparsity grows until a
    /// round prunes nothing new (see [`PruningEngine::prune_until_stable`]).
    ///
    /// # Errors
    ///
    /// - `UnimplementedFeature` for layer-kind objects
    /// - `ShapeMismatch` when a round mask tensor has a different shape from
    ///   the cumulative mask tensor at the same position
    /// - `TensorCountMismatch` when the round mask covers a different number
    ///   of tensors; match both variants (or `category() == "shape"`) to catch
    ///   every mask disagreement
    /// - whatever the strategy or `replace_weights` returns
    ///
    /// On any error the mask, object, snapshot and history are unchanged.
    pub fn prune(&mut self) -> Result<(PruningMask, T)> {
        if self.kind == ObjectKind::Layer {
            return Err(PruneError::UnimplementedFeature(
                "pruning a single layer is not supported yet; wrap it in a model".into(),
            ));
        }

        let round = self.strategy.compute_importance_mask(&self.snapshot)?;
        let combined = self.mask.merge_and(&round)?;
        let weights = combined.apply(self.snapshot.weights())?;
        let object = self.object.clone().replace_weights(weights)?;
        let snapshot = WeightSnapshot::from_object(&object)?;
        check_replacement(self.snapshot.weights(), snapshot.weights())?;

        let newly_pruned = combined.num_pruned() - self.mask.num_pruned();
        self.mask = combined;
        self.object = object;
        self.snapshot = snapshot;

        let stats = RoundStats::new(self.history.len() + 1, newly_pruned, &self.mask);
        info!(
            label = self.label.as_deref().unwrap_or("-"),
            round = stats.round,
            newly_pruned = stats.newly_pruned,
            total_pruned = stats.total_pruned,
            sparsity = stats.sparsity,
            "Pruning round complete"
        );
        self.history.push(stats);

        Ok((self.mask.clone(), self.object.clone()))
    }

    /// Prune until a round prunes nothing new, at most `max_rounds` times.
    ///
    /// Returns the number of rounds run. Once a round prunes nothing, the
    /// weights are unchanged and every later round returns the same mask.
    pub fn prune_until_stable(&mut self, max_rounds: usize) -> Result<usize> {
        for round in 1..=max_rounds {
            let before = self.mask.num_pruned();
            self.prune()?;
            if self.mask.num_pruned() == before {
                info!(
                    label = self.label.as_deref().unwrap_or("-"),
                    rounds = round,
                    sparsity = self.mask.sparsity(),
                    "Reached pruning fixed point"
                );
                return Ok(round);
            }
        }

        warn!(
            label = self.label.as_deref().unwrap_or("-"),
            max_rounds,
            "Stopped pruning before reaching a fixed point"
        );
        Ok(max_rounds)
    }

    /// Retrain the pruned object with `tuner`.
    ///
    /// The cumulative mask is re-applied to the tuned weights so pruned
    /// positions stay zero. On error the engine is left as it was.
    pub fn fine_tune<F: FineTune<T>>(&mut self, tuner: &mut F) -> Result<&T> {
        let tuned = tuner.fine_tune(self.object.clone(), &self.mask)?;
        let tuned_weights = tuned.weights();
        check_replacement(self.snapshot.weights(), &tuned_weights)?;

        let weights = self.mask.apply(&tuned_weights)?;
        let object = tuned.replace_weights(weights)?;
        let snapshot = WeightSnapshot::from_object(&object)?;

        self.object = object;
        self.snapshot = snapshot;

        debug!(
            label = self.label.as_deref().unwrap_or("-"),
            rounds = self.history.len(),
            "Fine-tuned pruned object"
        );

        Ok(&self.object)
    }

    /// Current (pruned) object
    pub fn object(&self) -> &T {
        &self.object
    }

    /// Consume the engine, returning the pruned object
    pub fn into_object(self) -> T {
        self.object
    }

    /// Declared kind of the object
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Cumulative mask
    pub fn mask(&self) -> &PruningMask {
        &self.mask
    }

    /// Current weight snapshot
    pub fn snapshot(&self) -> &WeightSnapshot {
        &self.snapshot
    }

    /// Importance strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Session label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of completed rounds
    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    /// Per-round statistics
    pub fn history(&self) -> &[RoundStats] {
        &self.history
    }

    /// Statistics of the latest round
    pub fn last_round(&self) -> Option<&RoundStats> {
        self.history.last()
    }
}

/// Check the object's declared kind.
fn classify<T: Trainable>(object: &T) -> Result<ObjectKind> {
    match object.kind() {
        ObjectKind::Unknown => Err(PruneError::UnsupportedObjectType {
            kind: object.type_name(),
        }),
        kind => Ok(kind),
    }
}
