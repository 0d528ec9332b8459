//! Trainable-object contract and reference implementations
//!
//! The pruning engine only talks to models through [`Trainable`]: it asks for
//! the object's declared kind, clones it, reads its ordered weight tensors and
//! writes a full replacement set back. [`Sequential`] and [`Layer`] are small
//! in-memory implementations of that contract.

use crate::{PruneError, Result, WeightTensor};
use serde::{Deserialize, Serialize};

/// Declared kind of a trainable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A model made of one or more layers
    Model,
    /// A single layer
    Layer,
    /// Anything else; rejected by the engine
    Unknown,
}

impl ObjectKind {
    /// Name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Model => "model",
            ObjectKind::Layer => "layer",
            ObjectKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract between the pruning engine and a model or layer.
///
/// `Clone` must produce an independent deep copy: the engine prunes its own
/// clone and never touches the caller's value.
pub trait Trainable: Clone {
    /// Declared kind of this object
    fn kind(&self) -> ObjectKind;

    /// Type description used in error messages
    fn type_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Ordered weight tensors, stable until weights are replaced
    fn weights(&self) -> Vec<WeightTensor>;

    /// Overwrite every weight tensor, returning the object in its post-write
    /// state. Tensor count and shapes must match the current weights exactly.
    fn replace_weights(self, weights: Vec<WeightTensor>) -> Result<Self>;
}

/// Check that `new` can replace `current` tensor for tensor.
pub fn check_replacement(current: &[WeightTensor], new: &[WeightTensor]) -> Result<()> {
    if current.len() != new.len() {
        return Err(PruneError::TensorCountMismatch {
            expected: current.len(),
            got: new.len(),
        });
    }
    for (i, (cur, next)) in current.iter().zip(new).enumerate() {
        if cur.shape != next.shape {
            return Err(PruneError::shape_mismatch(i, &cur.shape, &next.shape));
        }
        if next.data.len() != cur.numel() {
            return Err(PruneError::invalid_weights(format!(
                "tensor '{}' carries {} values for shape {:?}",
                next.name,
                next.data.len(),
                next.shape
            )));
        }
    }
    Ok(())
}

/// A single layer holding an ordered list of weight tensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name
    pub name: String,
    /// Weight tensors in declaration order
    pub tensors: Vec<WeightTensor>,
}

impl Layer {
    /// Create a layer from its tensors
    pub fn new(name: impl Into<String>, tensors: Vec<WeightTensor>) -> Self {
        Self {
            name: name.into(),
            tensors,
        }
    }

    /// Fully connected layer with a `[inputs, outputs]` kernel and an
    /// `[outputs]` bias
    pub fn dense(
        name: impl Into<String>,
        inputs: usize,
        outputs: usize,
        kernel: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<Self> {
        let name = name.into();
        let kernel = WeightTensor::new(format!("{name}/kernel"), vec![inputs, outputs], kernel)?;
        let bias = WeightTensor::new(format!("{name}/bias"), vec![outputs], bias)?;
        Ok(Self::new(name, vec![kernel, bias]))
    }

    /// Total parameters
    pub fn total_params(&self) -> usize {
        self.tensors.iter().map(|t| t.numel()).sum()
    }
}

impl Trainable for Layer {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Layer
    }

    fn weights(&self) -> Vec<WeightTensor> {
        self.tensors.clone()
    }

    fn replace_weights(mut self, weights: Vec<WeightTensor>) -> Result<Self> {
        check_replacement(&self.tensors, &weights)?;
        self.tensors = weights;
        Ok(self)
    }
}

/// A model made of layers applied in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequential {
    /// Model name
    pub name: String,
    /// Layers in execution order
    pub layers: Vec<Layer>,
}

impl Sequential {
    /// Create an empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    /// Append a layer
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Builder-style [`Sequential::add_layer`]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.add_layer(layer);
        self
    }

    /// Get layer by name
    pub fn get_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Layer names
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Total parameters
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.total_params()).sum()
    }

    /// Check that another model has the same tensor layout
    pub fn is_compatible(&self, other: &Self) -> bool {
        let ours = self.weights();
        let theirs = other.weights();
        ours.len() == theirs.len() && ours.iter().zip(&theirs).all(|(a, b)| a.shape == b.shape)
    }
}

impl Trainable for Sequential {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Model
    }

    fn weights(&self) -> Vec<WeightTensor> {
        self.layers
            .iter()
            .flat_map(|l| l.tensors.iter().cloned())
            .collect()
    }

    fn replace_weights(mut self, weights: Vec<WeightTensor>) -> Result<Self> {
        check_replacement(&self.weights(), &weights)?;

        let mut incoming = weights.into_iter();
        for layer in &mut self.layers {
            for tensor in &mut layer.tensors {
                // Count was checked above
                if let Some(next) = incoming.next() {
                    *tensor = next;
                }
            }
        }
        Ok(self)
    }
}
