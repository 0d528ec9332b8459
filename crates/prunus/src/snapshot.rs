//! Weight snapshot taken from a trainable object.

use prunus_core::{PruneError, Result, Trainable, WeightTensor};

/// Ordered weight tensors of an object, with a flattened view.
///
/// `flat_weight_array` concatenates every tensor's data in tensor order, then
/// element order within each tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSnapshot {
    weights: Vec<WeightTensor>,
    flat_weight_array: Vec<f32>,
}

impl WeightSnapshot {
    /// Snapshot the current weights of `object`
    pub fn from_object<T: Trainable>(object: &T) -> Result<Self> {
        Self::from_weights(object.weights())
    }

    /// Build from already extracted tensors
    pub fn from_weights(weights: Vec<WeightTensor>) -> Result<Self> {
        for tensor in &weights {
            let expected: usize = tensor.shape.iter().product();
            if tensor.data.len() != expected {
                return Err(PruneError::invalid_weights(format!(
                    "tensor '{}' has {} values for shape {:?}",
                    tensor.name,
                    tensor.data.len(),
                    tensor.shape
                )));
            }
        }

        let flat_weight_array = weights
            .iter()
            .flat_map(|t| t.data.iter().copied())
            .collect();

        Ok(Self {
            weights,
            flat_weight_array,
        })
    }

    /// Per-tensor weights
    pub fn weights(&self) -> &[WeightTensor] {
        &self.weights
    }

    /// All weights concatenated, tensor-major
    pub fn flat_weight_array(&self) -> &[f32] {
        &self.flat_weight_array
    }

    /// Per-tensor shapes
    pub fn shapes(&self) -> Vec<Vec<usize>> {
        self.weights.iter().map(|t| t.shape.clone()).collect()
    }

    /// Number of tensors
    pub fn num_tensors(&self) -> usize {
        self.weights.len()
    }

    /// Total parameters
    pub fn total_params(&self) -> usize {
        self.flat_weight_array.len()
    }

    /// Number of exactly-zero weights
    pub fn num_zeros(&self) -> usize {
        self.flat_weight_array.iter().filter(|&&w| w == 0.0).count()
    }
}
