//! Weight tensors

use crate::{PruneError, Result};
use serde::{Deserialize, Serialize};

/// Dense weight tensor stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTensor {
    /// Tensor name
    pub name: String,
    /// Tensor shape
    pub shape: Vec<usize>,
    /// Flattened data
    pub data: Vec<f32>,
}

impl WeightTensor {
    /// Create new weight tensor
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected_size: usize = shape.iter().product();
        if data.len() != expected_size {
            return Err(PruneError::invalid_weights(format!(
                "shape {:?} holds {} elements, got {}",
                shape,
                expected_size,
                data.len()
            )));
        }

        Ok(Self {
            name: name.into(),
            shape,
            data,
        })
    }

    /// Create zero tensor
    pub fn zeros(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let size: usize = shape.iter().product();
        Self {
            name: name.into(),
            shape,
            data: vec![0.0; size],
        }
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// L2 norm
    pub fn l2_norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Create mask where |value| > threshold, compared in `f64`
    pub fn magnitude_mask(&self, threshold: f64) -> Vec<bool> {
        self.data
            .iter()
            .map(|x| f64::from(x.abs()) > threshold)
            .collect()
    }

    /// Apply mask (zero out where mask is false)
    pub fn apply_mask(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.data.len() {
            return Err(PruneError::invalid_weights(format!(
                "mask of {} elements applied to tensor '{}' of {}",
                mask.len(),
                self.name,
                self.data.len()
            )));
        }
        Ok(Self {
            name: self.name.clone(),
            shape: self.shape.clone(),
            data: self
                .data
                .iter()
                .zip(mask)
                .map(|(x, &m)| if m { *x } else { 0.0 })
                .collect(),
        })
    }

    /// Count non-zero elements
    pub fn nnz(&self) -> usize {
        self.data.iter().filter(|&&x| x != 0.0).count()
    }

    /// Sparsity ratio (0.0 = dense, 1.0 = all zeros)
    pub fn sparsity(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        1.0 - (self.nnz() as f32 / self.numel() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_tensor() {
        let tensor =
            WeightTensor::new("test", vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        assert_eq!(tensor.numel(), 6);
        assert_eq!(tensor.shape, vec![2, 3]);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let result = WeightTensor::new("test", vec![2, 2], vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(PruneError::InvalidWeights(_))));
    }

    #[test]
    fn test_magnitude_mask() {
        let tensor = WeightTensor::new("test", vec![4], vec![0.1, -0.5, 0.3, -0.7]).unwrap();
        let mask = tensor.magnitude_mask(0.4);
        assert_eq!(mask, vec![false, true, false, true]);
    }

    #[test]
    fn test_magnitude_mask_ties_pruned() {
        let tensor = WeightTensor::new("test", vec![3], vec![0.4, -0.4, 0.5]).unwrap();
        assert_eq!(
            tensor.magnitude_mask(f64::from(0.4f32)),
            vec![false, false, true]
        );
    }

    #[test]
    fn test_magnitude_mask_above_rounded_threshold() {
        // 1.0 - 1e-9 rounds to 1.0 as f32 but must still keep 1.0
        let tensor = WeightTensor::new("test", vec![2], vec![1.0, -1.0]).unwrap();
        assert_eq!(tensor.magnitude_mask(1.0 - 1e-9), vec![true, true]);
        assert_eq!(tensor.magnitude_mask(1.0), vec![false, false]);
    }

    #[test]
    fn test_apply_mask() {
        let tensor = WeightTensor::new("test", vec![2, 2], vec![1.0, -2.0, 3.0, -4.0]).unwrap();
        let masked = tensor.apply_mask(&[true, false, false, true]).unwrap();
        assert_eq!(masked.data, vec![1.0, 0.0, 0.0, -4.0]);
        assert_eq!(masked.shape, vec![2, 2]);
        assert_eq!(masked.nnz(), 2);
        assert_eq!(masked.sparsity(), 0.5);
    }

    #[test]
    fn test_apply_mask_wrong_length() {
        let tensor = WeightTensor::zeros("test", vec![3]);
        assert!(tensor.apply_mask(&[true, false]).is_err());
    }

    #[test]
    fn test_l2_norm() {
        let tensor = WeightTensor::new("test", vec![4], vec![3.0, 4.0, 0.0, 0.0]).unwrap();
        assert_eq!(tensor.l2_norm(), 5.0);
    }

    #[test]
    fn test_empty_sparsity() {
        let tensor = WeightTensor::zeros("empty", vec![0]);
        assert_eq!(tensor.sparsity(), 0.0);
    }
}
