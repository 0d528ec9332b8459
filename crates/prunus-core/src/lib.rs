//! # Prunus Core
//!
//! Shared types for the Prunus weight-pruning library.
//!
//! - [`WeightTensor`] - a named, shaped, row-major `f32` tensor
//! - [`Trainable`] - the narrow contract a model or layer must satisfy to be
//!   pruned: declared kind, deep clone, ordered weights, full weight
//!   replacement
//! - [`Sequential`] / [`Layer`] - in-memory models implementing [`Trainable`]
//! - [`PruningMask`] - per-tensor keep-masks with AND-merging and statistics
//!
//! The pruning engine itself lives in the `prunus` crate.

mod error;
mod mask;
mod object;
mod tensor;

pub use error::{PruneError, Result};
pub use mask::{PruningMask, TensorMask};
pub use object::{check_replacement, Layer, ObjectKind, Sequential, Trainable};
pub use tensor::WeightTensor;

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        Layer, ObjectKind, PruneError, PruningMask, Result, Sequential, Trainable, WeightTensor,
    };
}
