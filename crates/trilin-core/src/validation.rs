//! Input validation for the trilinear operators.
//!
//! Every argument is checked for residency, then device agreement, then
//! contiguity, in argument order; the first failure is returned. Shape
//! checks run only once all arguments have passed the property checks.

use burn::tensor::backend::Backend;

use crate::error::{Result, TensorProperty, TrilinearError};
use crate::grid::CORNERS;
use crate::tensor::{ResidencyProbe, StridedTensor};

/// Property checks shared by all arguments of one operator call.
///
/// The first checked argument fixes the device every later argument must
/// live on.
#[derive(Debug)]
pub struct InputGuard<B: Backend> {
    require_accelerator: bool,
    device: Option<B::Device>,
}

impl<B: ResidencyProbe> InputGuard<B> {
    /// Create a guard for one call.
    pub fn new(require_accelerator: bool) -> Self {
        Self {
            require_accelerator,
            device: None,
        }
    }

    /// Check placement and contiguity of `tensor`.
    pub fn check<const D: usize>(
        &mut self,
        argument: &'static str,
        tensor: &StridedTensor<B, D>,
    ) -> Result<()> {
        self.check_placement(argument, &tensor.device())?;

        if !tensor.is_contiguous() {
            return Err(reject(argument, TensorProperty::NotContiguous));
        }

        tracing::trace!(argument, dims = ?tensor.dims(), "input accepted");
        Ok(())
    }

    /// Check residency of `device` and that it matches earlier arguments.
    pub fn check_placement(&mut self, argument: &'static str, device: &B::Device) -> Result<()> {
        if self.require_accelerator && !B::residency(device).is_accelerator() {
            return Err(reject(argument, TensorProperty::NotOnAccelerator));
        }

        let expected = self.device.get_or_insert_with(|| device.clone());
        if *expected != *device {
            return Err(reject(argument, TensorProperty::DeviceMismatch));
        }
        Ok(())
    }
}

fn reject(argument: &'static str, property: TensorProperty) -> TrilinearError {
    tracing::warn!(argument, %property, "rejecting input tensor");
    TrilinearError::invalid_property(argument, property)
}

/// Validate `feats [N, 8, F]` against `points [N, 3]`.
pub fn validate_forward_shapes(feats: [usize; 3], points: [usize; 2]) -> Result<()> {
    let [n, corners, _] = feats;
    if corners != CORNERS {
        return Err(TrilinearError::shape_mismatch(
            "feats",
            &[n, CORNERS, feats[2]],
            &feats,
        ));
    }
    validate_points(n, points)
}

/// Validate `grad [N, F]` against `feats [N, 8, F]` and `points [N, 3]`.
pub fn validate_backward_shapes(grad: [usize; 2], feats: [usize; 3], points: [usize; 2]) -> Result<()> {
    let expected = [feats[0], feats[2]];
    if grad != expected {
        return Err(TrilinearError::shape_mismatch("dL_dfeat_interp", &expected, &grad));
    }
    validate_forward_shapes(feats, points)
}

/// Validate a dense grid `[D, H, W, F]` against `points [N, 3]`.
pub fn validate_grid_shapes(grid: [usize; 4], points: [usize; 2]) -> Result<()> {
    if grid[..3].iter().any(|&extent| extent == 0) {
        return Err(TrilinearError::shape_mismatch(
            "grid",
            &[grid[0].max(1), grid[1].max(1), grid[2].max(1), grid[3]],
            &grid,
        ));
    }
    validate_points(points[0], points)
}

fn validate_points(n: usize, points: [usize; 2]) -> Result<()> {
    if points != [n, 3] {
        return Err(TrilinearError::shape_mismatch("points", &[n, 3], &points));
    }
    Ok(())
}
