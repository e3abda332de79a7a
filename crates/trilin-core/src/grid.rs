//! Dense feature grids.
//!
//! The operators work on per-point corner features `[N, 8, F]`. This module
//! bridges a dense grid `[D, H, W, F]` (z, y, x, feature) to that layout:
//! [`gather_corners`] collects the eight voxels surrounding each query point
//! together with the point's position inside its cell, and
//! [`scatter_corners`] sums corner gradients back into a grid-shaped
//! gradient.
//!
//! Query points are normalised to `[-1, 1]` per axis, `-1` and `1` being the
//! centres of the first and last voxel. Points outside are clamped to the
//! border; NaN coordinates are treated as `-1`.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

/// Number of interpolation corners of a cell.
pub const CORNERS: usize = 8;

/// Corner features of a batch of query points gathered from a dense grid.
#[derive(Debug, Clone)]
pub struct CornerSample<B: Backend> {
    /// Corner features `[N, 8, F]`.
    pub feats: Tensor<B, 3>,
    /// Position inside the cell `[N, 3]`, in `[-1, 1]`.
    pub local: Tensor<B, 2>,
    /// Flat voxel index of every corner `[N, 8]`.
    pub indices: Tensor<B, 2, Int>,
}

/// Lower and upper voxel index along one axis, plus the fractional offset.
fn axis_cell<B: Backend>(coord: Tensor<B, 1>, extent: usize) -> (Tensor<B, 1, Int>, Tensor<B, 1, Int>, Tensor<B, 1>) {
    let max = (extent - 1) as f64;
    let index = (coord + 1.0) * (0.5 * max);

    let lo = index.clone().floor().clamp(0.0, extent.saturating_sub(2) as f64);
    let hi = (lo.clone() + 1.0).clamp(0.0, max);
    let frac = (index - lo.clone()).clamp(0.0, 1.0);

    (lo.int(), hi.int(), frac)
}

/// Gather the eight corners of every point in `points [N, 3]` from `grid`.
///
/// # Arguments
/// * `grid` - Dense grid `[D, H, W, F]`; every spatial extent must be non-zero
/// * `points` - Normalised `(x, y, z)` coordinates `[N, 3]`
pub fn gather_corners<B: Backend>(grid: &Tensor<B, 4>, points: Tensor<B, 2>) -> CornerSample<B> {
    let [d0, d1, d2, f] = grid.dims(); // Z, Y, X, F

    // NaN has no cell; it samples the lower border like -inf does
    let points = points.clone().mask_fill(points.is_nan(), -1.0).clamp(-1.0, 1.0);
    let x = points.clone().narrow(1, 0, 1).squeeze::<1>(1);
    let y = points.clone().narrow(1, 1, 1).squeeze::<1>(1);
    let z = points.narrow(1, 2, 1).squeeze::<1>(1);

    let (x0, x1, tx) = axis_cell(x, d2);
    let (y0, y1, ty) = axis_cell(y, d1);
    let (z0, z1, tz) = axis_cell(z, d0);

    // Stride for [Z, Y, X] layout
    let stride_z = (d1 * d2) as i64;
    let stride_y = d2 as i64;

    let flat = grid.clone().reshape([d0 * d1 * d2, f]);

    let xs = [x0, x1];
    let ys = [y0, y1];
    let zs = [z0, z1];
    let mut indices = Vec::with_capacity(CORNERS);
    let mut corners = Vec::with_capacity(CORNERS);
    for xi in &xs {
        for yi in &ys {
            for zi in &zs {
                let idx = zi.clone() * stride_z + yi.clone() * stride_y + xi.clone();
                corners.push(flat.clone().select(0, idx.clone()));
                indices.push(idx);
            }
        }
    }

    let local = Tensor::stack::<2>(vec![tx * 2.0 - 1.0, ty * 2.0 - 1.0, tz * 2.0 - 1.0], 1);

    CornerSample {
        feats: Tensor::stack::<3>(corners, 1),
        local,
        indices: Tensor::stack::<2>(indices, 1),
    }
}

/// Sum corner gradients `[N, 8, F]` into a gradient shaped like the grid.
///
/// Voxels that are corners of several points accumulate every contribution.
pub fn scatter_corners<B: Backend>(
    grad_feats: Tensor<B, 3>,
    indices: Tensor<B, 2, Int>,
    grid_dims: [usize; 4],
) -> Tensor<B, 4> {
    let [d0, d1, d2, f] = grid_dims;
    let device = grad_feats.device();

    let mut acc = Tensor::<B, 2>::zeros([d0 * d1 * d2, f], &device);
    for c in 0..CORNERS {
        let idx = indices.clone().narrow(1, c, 1).squeeze::<1>(1);
        let values = grad_feats.clone().narrow(1, c, 1).squeeze::<2>(1);
        acc = acc.select_assign(0, idx, values);
    }
    acc.reshape(grid_dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn cube(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        // Shape [Z=2, Y=2, X=2, F=1], value = 100z + 10y + x
        let data_vec = vec![0.0, 1.0, 10.0, 11.0, 100.0, 101.0, 110.0, 111.0];
        Tensor::from_data(TensorData::new(data_vec, [2, 2, 2, 1]), device)
    }

    #[test]
    fn test_gather_corner_order() {
        let device = Default::default();
        let grid = cube(&device);
        let points = Tensor::<TestBackend, 2>::zeros([1, 3], &device);

        let sample = gather_corners(&grid, points);
        assert_eq!(sample.feats.dims(), [1, 8, 1]);

        let data = sample.feats.into_data();
        let slice = data.as_slice::<f32>().unwrap();
        // corner c = 4i + 2j + k holds voxel (z=k, y=j, x=i)
        assert_eq!(slice, &[0.0, 100.0, 10.0, 110.0, 1.0, 101.0, 11.0, 111.0]);

        let local = sample.local.into_data();
        for v in local.as_slice::<f32>().unwrap() {
            assert!(v.abs() < 1e-6);
        }
    }

    #[test]
    fn test_gather_upper_border() {
        let device = Default::default();
        let grid = cube(&device);
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 1.0, 1.0], [5.0, -5.0, 5.0]], &device);

        let sample = gather_corners(&grid, points);
        let local = sample.local.into_data();
        assert_eq!(local.as_slice::<f32>().unwrap(), &[1.0, 1.0, 1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_gather_nan_samples_lower_border() {
        let device = Default::default();
        let grid = cube(&device);
        let points = Tensor::<TestBackend, 2>::from_floats([[f32::NAN, 1.0, 1.0]], &device);

        let sample = gather_corners(&grid, points);
        let local = sample.local.into_data();
        assert_eq!(local.as_slice::<f32>().unwrap(), &[-1.0, 1.0, 1.0]);
        let indices = sample.indices.into_data().to_vec::<i64>().unwrap();
        assert!(indices.iter().all(|&i| (0..8).contains(&i)));
    }

    #[test]
    fn test_gather_single_voxel_axis() {
        let device = Default::default();
        let grid = Tensor::<TestBackend, 4>::ones([1, 1, 3, 2], &device);
        let points = Tensor::<TestBackend, 2>::from_floats([[0.5, 0.3, -0.2]], &device);

        let sample = gather_corners(&grid, points);
        let data = sample.indices.into_data();
        let idx = data.to_vec::<i64>().unwrap();
        // y and z collapse onto index 0; x spans voxels 1 and 2
        assert_eq!(idx, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_scatter_accumulates_shared_voxels() {
        let device = Default::default();
        let grad = Tensor::<TestBackend, 3>::ones([2, 8, 1], &device);
        let indices = Tensor::<TestBackend, 2, Int>::zeros([2, 8], &device);

        let out = scatter_corners(grad, indices, [1, 1, 2, 1]);
        let data = out.into_data();
        assert_eq!(data.as_slice::<f32>().unwrap(), &[16.0, 0.0]);
    }
}
