//! Error types for trilinear interpolation operators.
//!
//! Validation failures are reported before any kernel work is queued and
//! always name the offending argument.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tensor property that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorProperty {
    /// The tensor lives in host memory but an accelerator was required.
    NotOnAccelerator,
    /// The tensor lives on a different device than the first argument.
    DeviceMismatch,
    /// The tensor's storage is not laid out row-major without gaps.
    NotContiguous,
}

impl fmt::Display for TensorProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOnAccelerator => write!(f, "must be resident on an accelerator device"),
            Self::DeviceMismatch => write!(f, "must be resident on the same device as the other inputs"),
            Self::NotContiguous => write!(f, "must be contiguous"),
        }
    }
}

/// Main error type for trilinear operators.
#[derive(Error, Debug)]
pub enum TrilinearError {
    /// An input tensor is not device-resident or not contiguous.
    #[error("Invalid tensor property: `{argument}` {property}")]
    InvalidTensorProperty {
        argument: &'static str,
        property: TensorProperty,
    },

    /// An input tensor has the wrong number of dimensions.
    #[error("Rank mismatch: `{argument}` expected rank {expected}, got {actual}")]
    RankMismatch {
        argument: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An input tensor has incompatible dimensions.
    #[error("Shape mismatch: `{argument}` expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        argument: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Failure reported by the kernel executor.
    #[error("Kernel error: {0}")]
    Kernel(String),
}

/// Result type for trilinear operations.
pub type Result<T> = std::result::Result<T, TrilinearError>;

impl TrilinearError {
    /// Create an invalid tensor property error.
    pub fn invalid_property(argument: &'static str, property: TensorProperty) -> Self {
        Self::InvalidTensorProperty { argument, property }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(argument: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            argument,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a kernel error.
    pub fn kernel(msg: impl Into<String>) -> Self {
        Self::Kernel(msg.into())
    }

    /// Returns the tensor property that failed, if this is a validation error.
    pub fn property(&self) -> Option<TensorProperty> {
        match self {
            Self::InvalidTensorProperty { property, .. } => Some(*property),
            _ => None,
        }
    }
}
