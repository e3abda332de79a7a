//! Operator configuration.

use burn::config::Config;

use crate::kernel::TrilinearKernel;
use crate::operator::Trilinear;
use crate::tensor::ResidencyProbe;

/// Configuration for the [`Trilinear`] operator pair.
///
/// # Examples
/// ```rust
/// use trilin_core::TrilinearConfig;
///
/// let config = TrilinearConfig::new().with_require_accelerator(false);
/// assert!(config.validate_shapes);
/// ```
#[derive(Config, Debug, PartialEq)]
pub struct TrilinearConfig {
    /// Reject tensors that live in host memory.
    #[config(default = true)]
    pub require_accelerator: bool,
    /// Check that argument shapes agree before dispatching.
    ///
    /// Applies to `forward` and `backward` only. `sample_grid` and
    /// `sample_grid_backward` always validate shapes, since gathering
    /// corners from the grid depends on them.
    #[config(default = true)]
    pub validate_shapes: bool,
}

impl TrilinearConfig {
    /// Build the operator pair on top of `kernel`.
    pub fn init<B, K>(&self, kernel: K) -> Trilinear<B, K>
    where
        B: ResidencyProbe,
        K: TrilinearKernel<B>,
    {
        Trilinear::new(self.clone(), kernel)
    }
}
