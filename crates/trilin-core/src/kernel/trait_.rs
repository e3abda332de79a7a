//! Kernel executor trait.
//!
//! Executors perform the numerical work behind the operators after inputs
//! have been validated. They receive tensors by value (burn tensors share
//! storage on clone) and must return freshly allocated results.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// Trilinear interpolation kernel executor.
///
/// # Shapes
/// * `feats` - `[N, 8, F]`, corner `c = 4i + 2j + k` along x, y, z
/// * `points` - `[N, 3]`, local coordinates in `[-1, 1]`
/// * output of `forward` and `grad` of `backward` - `[N, F]`
///
/// # Type Parameters
/// * `B` - The burn backend
pub trait TrilinearKernel<B: Backend> {
    /// Interpolate the corner features of every point.
    fn forward(&self, feats: Tensor<B, 3>, points: Tensor<B, 2>) -> Result<Tensor<B, 2>>;

    /// Gradient of the loss with respect to `feats`, given the gradient with
    /// respect to the interpolated output.
    fn backward(
        &self,
        grad: Tensor<B, 2>,
        feats: Tensor<B, 3>,
        points: Tensor<B, 2>,
    ) -> Result<Tensor<B, 3>>;

    /// Get the name of this executor.
    fn name(&self) -> &'static str;
}
