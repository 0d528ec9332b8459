//! Error types for pruning operations

use thiserror::Error;

/// Result type for pruning operations
pub type Result<T> = std::result::Result<T, PruneError>;

/// Pruning errors
#[derive(Debug, Error)]
pub enum PruneError {
    /// Object is neither a model nor a layer
    #[error("Unsupported object type: {kind} is not a Layer, nor a Model")]
    UnsupportedObjectType { kind: String },

    /// Feature not available in this version
    #[error("Unimplemented feature: {0}")]
    UnimplementedFeature(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Mask or tensor shape disagrees with its counterpart
    #[error("Shape mismatch at tensor {tensor}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        tensor: usize,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Wrong number of tensors
    #[error("Tensor count mismatch: expected {expected}, got {got}")]
    TensorCountMismatch { expected: usize, got: usize },

    /// Weights unusable for pruning
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PruneError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PruneError::Configuration(message.into())
    }

    /// Create a shape mismatch error for the tensor at `tensor`.
    pub fn shape_mismatch(tensor: usize, expected: &[usize], got: &[usize]) -> Self {
        PruneError::ShapeMismatch {
            tensor,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid weights error.
    pub fn invalid_weights(message: impl Into<String>) -> Self {
        PruneError::InvalidWeights(message.into())
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            PruneError::UnsupportedObjectType { .. } => "object_type",
            PruneError::UnimplementedFeature(_) => "unimplemented",
            PruneError::Configuration(_) => "config",
            PruneError::ShapeMismatch { .. } | PruneError::TensorCountMismatch { .. } => "shape",
            PruneError::InvalidWeights(_) => "weights",
            PruneError::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for PruneError {
    fn from(e: serde_json::Error) -> Self {
        PruneError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = PruneError::shape_mismatch(2, &[4, 3], &[3, 4]);
        let msg = err.to_string();
        assert!(msg.contains("tensor 2"));
        assert!(msg.contains("[4, 3]"));
        assert!(msg.contains("[3, 4]"));
        assert_eq!(err.category(), "shape");
    }

    #[test]
    fn test_unsupported_object_message() {
        let err = PruneError::UnsupportedObjectType {
            kind: "str".into(),
        };
        assert!(err.to_string().contains("str"));
        assert_eq!(err.category(), "object_type");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: PruneError = json_err.into();
        assert!(matches!(err, PruneError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + std::error::Error>() {}
        assert_send_sync::<PruneError>();
    }
}
