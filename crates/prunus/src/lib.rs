// Test modules have minor lints that don't affect production code
#![cfg_attr(test, allow(clippy::useless_vec))]

//! Magnitude-based weight pruning
//!
//! This crate prunes trainable objects round by round:
//! - A pruning engine holding a private clone, a weight snapshot, and a
//!   cumulative keep-mask that only ever loses entries
//! - A magnitude strategy that prunes weights at or below a percentile of
//!   the absolute weights
//! - A fine-tuning hook run between rounds
//!
//! ```
//! use prunus::{Layer, PruningConfig, PruningEngine, Sequential};
//!
//! let model = Sequential::new("mlp").with_layer(
//!     Layer::dense("fc", 2, 2, vec![0.1, -0.9, 0.4, -0.2], vec![0.3, 0.0]).unwrap(),
//! );
//!
//! let mut engine = PruningEngine::magnitude(&model, &PruningConfig::with_rate(50.0)).unwrap();
//! let (mask, pruned) = engine.prune().unwrap();
//!
//! assert_eq!(mask.num_pruned(), 3);
//! assert_eq!(pruned.layers[0].tensors[0].data, vec![0.0, -0.9, 0.4, 0.0]);
//! ```

mod config;
mod engine;
mod magnitude;
mod percentile;
mod snapshot;
mod strategy;

pub use config::PruningConfig;
pub use engine::{PruningEngine, RoundStats};
pub use magnitude::MagnitudePruning;
pub use percentile::percentile;
pub use snapshot::WeightSnapshot;
pub use strategy::{FineTune, ImportanceStrategy, NoFineTune};

pub use prunus_core::{
    check_replacement, Layer, ObjectKind, PruneError, PruningMask, Result, Sequential, TensorMask,
    Trainable, WeightTensor,
};

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        FineTune, ImportanceStrategy, Layer, MagnitudePruning, ObjectKind, PruneError,
        PruningConfig, PruningEngine, PruningMask, Result, Sequential, Trainable, WeightTensor,
    };
}
