//! Tensors passed through the registration surface.
//!
//! Entry points take arguments of different ranks, so the table carries them
//! as an [`Operand`] and each entry unpacks the rank it expects.

use burn::tensor::backend::Backend;
use trilin_core::{StridedTensor, TrilinearError};

/// Tensor argument or result of a registered entry point.
#[derive(Debug, Clone)]
pub enum Operand<B: Backend> {
    /// Rank-2 tensor such as `points` or the interpolated output.
    Rank2(StridedTensor<B, 2>),
    /// Rank-3 tensor such as `feats`.
    Rank3(StridedTensor<B, 3>),
}

impl<B: Backend> Operand<B> {
    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        match self {
            Self::Rank2(_) => 2,
            Self::Rank3(_) => 3,
        }
    }

    /// Logical shape.
    pub fn dims(&self) -> Vec<usize> {
        match self {
            Self::Rank2(t) => t.dims().to_vec(),
            Self::Rank3(t) => t.dims().to_vec(),
        }
    }

    /// Unpack a rank-2 tensor bound to `argument`.
    pub fn into_rank2(self, argument: &'static str) -> Result<StridedTensor<B, 2>, TrilinearError> {
        match self {
            Self::Rank2(t) => Ok(t),
            other => Err(TrilinearError::RankMismatch {
                argument,
                expected: 2,
                actual: other.rank(),
            }),
        }
    }

    /// Unpack a rank-3 tensor bound to `argument`.
    pub fn into_rank3(self, argument: &'static str) -> Result<StridedTensor<B, 3>, TrilinearError> {
        match self {
            Self::Rank3(t) => Ok(t),
            other => Err(TrilinearError::RankMismatch {
                argument,
                expected: 3,
                actual: other.rank(),
            }),
        }
    }
}

impl<B: Backend> From<StridedTensor<B, 2>> for Operand<B> {
    fn from(t: StridedTensor<B, 2>) -> Self {
        Self::Rank2(t)
    }
}

impl<B: Backend> From<StridedTensor<B, 3>> for Operand<B> {
    fn from(t: StridedTensor<B, 3>) -> Self {
        Self::Rank3(t)
    }
}
