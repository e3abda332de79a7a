//! Kernel expressed as burn tensor operations.
//!
//! Runs on whatever device the backend targets, so the same executor serves
//! accelerator backends and the CPU test backends.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::TrilinearKernel;
use super::weights::corner_weights;
use crate::error::Result;
use crate::grid::CORNERS;

/// Backend-generic trilinear kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorOpsKernel;

impl TensorOpsKernel {
    /// Create a new tensor-ops kernel.
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> TrilinearKernel<B> for TensorOpsKernel {
    fn forward(&self, feats: Tensor<B, 3>, points: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        // [N, 8, 1] broadcast over features
        let weights = corner_weights(points).unsqueeze_dim::<3>(2);
        Ok((feats * weights).sum_dim(1).squeeze::<2>(1))
    }

    fn backward(
        &self,
        grad: Tensor<B, 2>,
        feats: Tensor<B, 3>,
        points: Tensor<B, 2>,
    ) -> Result<Tensor<B, 3>> {
        let [n, _, f] = feats.dims();
        let weights = corner_weights(points).unsqueeze_dim::<3>(2);
        let grad = grad.unsqueeze_dim::<3>(1).expand([n, CORNERS, f]);
        Ok(grad * weights)
    }

    fn name(&self) -> &'static str {
        "tensor-ops"
    }
}
