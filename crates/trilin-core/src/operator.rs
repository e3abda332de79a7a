//! Forward and backward trilinear operators.
//!
//! Both operators validate every input before dispatching to the kernel
//! executor. A validation failure ends the call without touching the
//! executor; executor errors are returned unchanged.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;

use crate::config::TrilinearConfig;
use crate::error::{Result, TrilinearError};
use crate::grid::{gather_corners, scatter_corners};
use crate::kernel::TrilinearKernel;
use crate::tensor::{ResidencyProbe, StridedTensor};
use crate::validation::{
    validate_backward_shapes, validate_forward_shapes, validate_grid_shapes, InputGuard,
};

/// Trilinear interpolation operator pair.
///
/// Holds only configuration and the executor; calls are stateless.
///
/// # Type Parameters
/// * `B` - The burn backend
/// * `K` - The kernel executor
///
/// # Examples
/// ```rust
/// use trilin_core::{TrilinearConfig, TensorOpsKernel, StridedTensor};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let op = TrilinearConfig::new()
///     .with_require_accelerator(false)
///     .init::<Backend, _>(TensorOpsKernel::new());
///
/// let feats = StridedTensor::new(Tensor::<Backend, 3>::ones([4, 8, 2], &device));
/// let points = StridedTensor::new(Tensor::<Backend, 2>::zeros([4, 3], &device));
/// let out = op.forward(&feats, &points).unwrap();
/// assert_eq!(out.dims(), [4, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Trilinear<B: Backend, K> {
    config: TrilinearConfig,
    kernel: K,
    _backend: PhantomData<B>,
}

impl<B, K> Trilinear<B, K>
where
    B: ResidencyProbe,
    K: TrilinearKernel<B>,
{
    /// Create the operator pair.
    pub fn new(config: TrilinearConfig, kernel: K) -> Self {
        Self {
            config,
            kernel,
            _backend: PhantomData,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrilinearConfig {
        &self.config
    }

    /// Get the kernel executor.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    fn guard(&self) -> InputGuard<B> {
        InputGuard::new(self.config.require_accelerator)
    }

    /// Interpolate corner features.
    ///
    /// # Arguments
    /// * `feats` - Corner features `[N, 8, F]`
    /// * `points` - Local coordinates `[N, 3]` in `[-1, 1]`
    ///
    /// # Returns
    /// Newly allocated `[N, F]` tensor
    pub fn forward(
        &self,
        feats: &StridedTensor<B, 3>,
        points: &StridedTensor<B, 2>,
    ) -> Result<StridedTensor<B, 2>> {
        let mut guard = self.guard();
        guard.check("feats", feats)?;
        guard.check("points", points)?;
        if self.config.validate_shapes {
            validate_forward_shapes(feats.dims(), points.dims())?;
        }

        tracing::debug!(
            kernel = self.kernel.name(),
            feats = ?feats.dims(),
            points = ?points.dims(),
            "trilinear forward"
        );
        let out = self.kernel.forward(feats.data().clone(), points.data().clone())?;
        Ok(StridedTensor::new(out))
    }

    /// Gradient with respect to `feats`.
    ///
    /// # Arguments
    /// * `grad_output` - Gradient of the loss w.r.t. the forward output `[N, F]`
    /// * `feats` - Corner features `[N, 8, F]` passed to the forward call
    /// * `points` - Local coordinates `[N, 3]` passed to the forward call
    ///
    /// # Returns
    /// Newly allocated `[N, 8, F]` tensor
    pub fn backward(
        &self,
        grad_output: &StridedTensor<B, 2>,
        feats: &StridedTensor<B, 3>,
        points: &StridedTensor<B, 2>,
    ) -> Result<StridedTensor<B, 3>> {
        let mut guard = self.guard();
        guard.check("dL_dfeat_interp", grad_output)?;
        guard.check("feats", feats)?;
        guard.check("points", points)?;
        if self.config.validate_shapes {
            validate_backward_shapes(grad_output.dims(), feats.dims(), points.dims())?;
        }

        tracing::debug!(
            kernel = self.kernel.name(),
            grad = ?grad_output.dims(),
            feats = ?feats.dims(),
            "trilinear backward"
        );
        let out = self.kernel.backward(
            grad_output.data().clone(),
            feats.data().clone(),
            points.data().clone(),
        )?;
        Ok(StridedTensor::new(out))
    }

    /// Sample a dense grid `[D, H, W, F]` at normalised points `[N, 3]`.
    pub fn sample_grid(
        &self,
        grid: &StridedTensor<B, 4>,
        points: &StridedTensor<B, 2>,
    ) -> Result<StridedTensor<B, 2>> {
        let mut guard = self.guard();
        guard.check("grid", grid)?;
        guard.check("points", points)?;
        validate_grid_shapes(grid.dims(), points.dims())?;

        tracing::debug!(
            kernel = self.kernel.name(),
            grid = ?grid.dims(),
            points = ?points.dims(),
            "grid sample forward"
        );
        let sample = gather_corners(grid.data(), points.data().clone());
        let out = self.kernel.forward(sample.feats, sample.local)?;
        Ok(StridedTensor::new(out))
    }

    /// Gradient of [`Self::sample_grid`] with respect to the grid.
    ///
    /// # Returns
    /// Newly allocated tensor shaped like `grid`
    pub fn sample_grid_backward(
        &self,
        grad_output: &StridedTensor<B, 2>,
        grid: &StridedTensor<B, 4>,
        points: &StridedTensor<B, 2>,
    ) -> Result<StridedTensor<B, 4>> {
        let mut guard = self.guard();
        guard.check("dL_dfeat_interp", grad_output)?;
        guard.check("grid", grid)?;
        guard.check("points", points)?;
        validate_grid_shapes(grid.dims(), points.dims())?;
        let expected = [points.dims()[0], grid.dims()[3]];
        if grad_output.dims() != expected {
            return Err(TrilinearError::shape_mismatch(
                "dL_dfeat_interp",
                &expected,
                &grad_output.dims(),
            ));
        }

        tracing::debug!(
            kernel = self.kernel.name(),
            grid = ?grid.dims(),
            points = ?points.dims(),
            "grid sample backward"
        );
        let sample = gather_corners(grid.data(), points.data().clone());
        let grad_feats = self
            .kernel
            .backward(grad_output.data().clone(), sample.feats, sample.local)?;
        Ok(StridedTensor::new(scatter_corners(grad_feats, sample.indices, grid.dims())))
    }
}
