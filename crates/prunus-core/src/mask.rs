//! Keep-masks over a model's weight tensors

use crate::{PruneError, Result, WeightTensor};
use serde::{Deserialize, Serialize};

/// Keep-mask for one weight tensor: true = keep, false = zero out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorMask {
    /// Shape of the masked tensor
    pub shape: Vec<usize>,
    /// Flattened mask values, row-major like the tensor data
    pub keep: Vec<bool>,
}

impl TensorMask {
    /// Create from raw mask data
    pub fn new(shape: Vec<usize>, keep: Vec<bool>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if keep.len() != expected {
            return Err(PruneError::invalid_weights(format!(
                "mask for shape {:?} needs {} values, got {}",
                shape,
                expected,
                keep.len()
            )));
        }
        Ok(Self { shape, keep })
    }

    /// Mask keeping every element
    pub fn all_keep(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            shape,
            keep: vec![true; size],
        }
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.keep.len()
    }

    /// Number of kept elements
    pub fn kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// Number of pruned elements
    pub fn pruned(&self) -> usize {
        self.numel() - self.kept()
    }

    /// Fraction of pruned elements
    pub fn sparsity(&self) -> f32 {
        if self.keep.is_empty() {
            return 0.0;
        }
        self.pruned() as f32 / self.numel() as f32
    }

    /// Mask values as 0.0 / 1.0
    pub fn to_values(&self) -> Vec<f32> {
        self.keep.iter().map(|&k| if k { 1.0 } else { 0.0 }).collect()
    }
}

/// Keep-masks for every weight tensor of an object, in tensor order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruningMask {
    tensors: Vec<TensorMask>,
}

impl PruningMask {
    /// Create from per-tensor masks
    pub fn from_tensors(tensors: Vec<TensorMask>) -> Self {
        Self { tensors }
    }

    /// Mask keeping every weight of the given shapes
    pub fn all_keep<I>(shapes: I) -> Self
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        Self {
            tensors: shapes.into_iter().map(TensorMask::all_keep).collect(),
        }
    }

    /// Mask keeping every weight of `weights`
    pub fn for_weights(weights: &[WeightTensor]) -> Self {
        Self::all_keep(weights.iter().map(|w| w.shape.clone()))
    }

    /// Number of tensor masks
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// True when the mask covers no tensors
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Mask for tensor `index`
    pub fn get(&self, index: usize) -> Option<&TensorMask> {
        self.tensors.get(index)
    }

    /// Iterate over tensor masks
    pub fn iter(&self) -> std::slice::Iter<'_, TensorMask> {
        self.tensors.iter()
    }

    /// Per-tensor shapes
    pub fn shapes(&self) -> Vec<&[usize]> {
        self.tensors.iter().map(|t| t.shape.as_slice()).collect()
    }

    /// Check if an element is kept (out-of-range reads as kept)
    pub fn is_kept(&self, tensor: usize, index: usize) -> bool {
        self.tensors
            .get(tensor)
            .and_then(|t| t.keep.get(index))
            .copied()
            .unwrap_or(true)
    }

    /// Verify that `other` covers the same tensors with the same shapes
    pub fn check_shapes(&self, other: &PruningMask) -> Result<()> {
        if self.tensors.len() != other.tensors.len() {
            return Err(PruneError::TensorCountMismatch {
                expected: self.tensors.len(),
                got: other.tensors.len(),
            });
        }
        for (i, (ours, theirs)) in self.tensors.iter().zip(&other.tensors).enumerate() {
            if ours.shape != theirs.shape || ours.keep.len() != theirs.keep.len() {
                return Err(PruneError::shape_mismatch(i, &ours.shape, &theirs.shape));
            }
        }
        Ok(())
    }

    /// Merge with another mask (AND operation - both must keep)
    pub fn merge_and(&self, other: &PruningMask) -> Result<Self> {
        self.check_shapes(other)?;

        let tensors = self
            .tensors
            .iter()
            .zip(&other.tensors)
            .map(|(a, b)| TensorMask {
                shape: a.shape.clone(),
                keep: a.keep.iter().zip(&b.keep).map(|(&x, &y)| x && y).collect(),
            })
            .collect();

        Ok(Self { tensors })
    }

    /// Zero every pruned position of `weights`, leaving kept values as-is
    pub fn apply(&self, weights: &[WeightTensor]) -> Result<Vec<WeightTensor>> {
        if self.tensors.len() != weights.len() {
            return Err(PruneError::TensorCountMismatch {
                expected: self.tensors.len(),
                got: weights.len(),
            });
        }

        self.tensors
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(i, (mask, tensor))| {
                if mask.shape != tensor.shape {
                    return Err(PruneError::shape_mismatch(i, &mask.shape, &tensor.shape));
                }
                tensor.apply_mask(&mask.keep)
            })
            .collect()
    }

    /// True when every element pruned by `earlier` is also pruned here
    pub fn preserves(&self, earlier: &PruningMask) -> bool {
        self.check_shapes(earlier).is_ok()
            && self
                .tensors
                .iter()
                .zip(&earlier.tensors)
                .all(|(now, then)| now.keep.iter().zip(&then.keep).all(|(&n, &t)| t || !n))
    }

    /// Total number of masked elements
    pub fn numel(&self) -> usize {
        self.tensors.iter().map(|t| t.numel()).sum()
    }

    /// Total kept elements
    pub fn num_kept(&self) -> usize {
        self.tensors.iter().map(|t| t.kept()).sum()
    }

    /// Total pruned elements
    pub fn num_pruned(&self) -> usize {
        self.numel() - self.num_kept()
    }

    /// Overall sparsity (fraction of pruned elements)
    pub fn sparsity(&self) -> f32 {
        let total = self.numel();
        if total == 0 {
            return 0.0;
        }
        self.num_pruned() as f32 / total as f32
    }

    /// Per-tensor sparsity
    pub fn tensor_sparsity(&self) -> Vec<f32> {
        self.tensors.iter().map(|t| t.sparsity()).collect()
    }
}

impl<'a> IntoIterator for &'a PruningMask {
    type Item = &'a TensorMask;
    type IntoIter = std::slice::Iter<'a, TensorMask>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(parts: Vec<(Vec<usize>, Vec<bool>)>) -> PruningMask {
        PruningMask::from_tensors(
            parts
                .into_iter()
                .map(|(shape, keep)| TensorMask::new(shape, keep).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_all_keep() {
        let m = PruningMask::all_keep(vec![vec![2, 3], vec![3]]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.numel(), 9);
        assert_eq!(m.num_pruned(), 0);
        assert_eq!(m.sparsity(), 0.0);
        let shapes = m.shapes();
        assert_eq!(shapes[0], &[2usize, 3][..]);
        assert_eq!(shapes[1], &[3usize][..]);
    }

    #[test]
    fn test_tensor_mask_length_checked() {
        assert!(TensorMask::new(vec![2, 2], vec![true; 3]).is_err());
    }

    #[test]
    fn test_merge_and() {
        let a = mask(vec![(vec![4], vec![true, true, false, false])]);
        let b = mask(vec![(vec![4], vec![true, false, true, false])]);

        let merged = a.merge_and(&b).unwrap();
        assert_eq!(merged.get(0).unwrap().keep, vec![true, false, false, false]);
        assert!(merged.preserves(&a));
        assert!(merged.preserves(&b));
        assert!(!a.preserves(&merged));
    }

    #[test]
    fn test_merge_and_shape_mismatch() {
        let a = mask(vec![(vec![2, 2], vec![true; 4])]);
        let b = mask(vec![(vec![4], vec![true; 4])]);

        let err = a.merge_and(&b).unwrap_err();
        assert!(matches!(err, PruneError::ShapeMismatch { tensor: 0, .. }));
    }

    #[test]
    fn test_merge_and_count_mismatch() {
        let a = PruningMask::all_keep(vec![vec![2], vec![2]]);
        let b = PruningMask::all_keep(vec![vec![2]]);
        assert!(matches!(
            a.merge_and(&b),
            Err(PruneError::TensorCountMismatch { .. })
        ));
    }

    #[test]
    fn test_apply() {
        let weights = vec![
            WeightTensor::new("w", vec![2, 2], vec![1.0, -2.0, 3.0, -4.0]).unwrap(),
            WeightTensor::new("b", vec![2], vec![0.5, -0.5]).unwrap(),
        ];
        let m = mask(vec![
            (vec![2, 2], vec![false, true, true, false]),
            (vec![2], vec![true, false]),
        ]);

        let pruned = m.apply(&weights).unwrap();
        assert_eq!(pruned[0].data, vec![0.0, -2.0, 3.0, 0.0]);
        assert_eq!(pruned[1].data, vec![0.5, 0.0]);
        assert_eq!(pruned[0].shape, vec![2, 2]);
    }

    #[test]
    fn test_apply_shape_mismatch() {
        let weights = vec![WeightTensor::zeros("w", vec![4])];
        let m = PruningMask::all_keep(vec![vec![2, 2]]);
        assert!(matches!(
            m.apply(&weights),
            Err(PruneError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_statistics() {
        let m = mask(vec![
            (vec![4], vec![true, false, false, false]),
            (vec![2], vec![true, true]),
        ]);
        assert_eq!(m.num_kept(), 3);
        assert_eq!(m.num_pruned(), 3);
        assert_eq!(m.sparsity(), 0.5);
        assert_eq!(m.tensor_sparsity(), vec![0.75, 0.0]);
        assert!(!m.is_kept(0, 1));
        assert!(m.is_kept(1, 1));
        assert!(m.is_kept(5, 0));
        assert_eq!(m.get(0).unwrap().to_values(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = mask(vec![(vec![2], vec![true, false])]);
        let json = serde_json::to_string(&m).unwrap();
        let back: PruningMask = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
