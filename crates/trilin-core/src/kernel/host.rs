//! Reference kernel over host slices.
//!
//! Reads the inputs back to the host, computes in `f64` with one rayon task
//! per query point, and uploads the result to the device of `feats`. Useful
//! as a numerical reference for other executors.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rayon::prelude::*;

use super::trait_::TrilinearKernel;
use super::weights::corner_weights_host;
use crate::error::{Result, TrilinearError};
use crate::grid::CORNERS;

/// Host reference kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostKernel;

impl HostKernel {
    /// Create a new host kernel.
    pub fn new() -> Self {
        Self
    }
}

fn read_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f64>> {
    tensor
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|e| TrilinearError::kernel(format!("failed to read tensor on host: {:?}", e)))
}

impl<B: Backend> TrilinearKernel<B> for HostKernel {
    fn forward(&self, feats: Tensor<B, 3>, points: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let device = feats.device();
        let [n, _, f] = feats.dims();
        let feats = read_host(feats)?;
        let points = read_host(points)?;

        let mut out = vec![0.0f64; n * f];
        if f > 0 {
            out.par_chunks_mut(f).enumerate().for_each(|(row, out_row)| {
                let weights = corner_weights_host(&points[row * 3..row * 3 + 3]);
                for (c, weight) in weights.iter().enumerate() {
                    let base = (row * CORNERS + c) * f;
                    for (acc, value) in out_row.iter_mut().zip(&feats[base..base + f]) {
                        *acc += weight * value;
                    }
                }
            });
        }

        Ok(Tensor::from_data(TensorData::new(out, [n, f]), &device))
    }

    fn backward(
        &self,
        grad: Tensor<B, 2>,
        feats: Tensor<B, 3>,
        points: Tensor<B, 2>,
    ) -> Result<Tensor<B, 3>> {
        let device = feats.device();
        let [n, _, f] = feats.dims();
        let grad = read_host(grad)?;
        let points = read_host(points)?;

        let mut out = vec![0.0f64; n * CORNERS * f];
        if f > 0 {
            out.par_chunks_mut(CORNERS * f).enumerate().for_each(|(row, out_block)| {
                let weights = corner_weights_host(&points[row * 3..row * 3 + 3]);
                let grad_row = &grad[row * f..(row + 1) * f];
                for (weight, out_corner) in weights.iter().zip(out_block.chunks_mut(f)) {
                    for (dst, g) in out_corner.iter_mut().zip(grad_row) {
                        *dst = weight * g;
                    }
                }
            });
        }

        Ok(Tensor::from_data(TensorData::new(out, [n, CORNERS, f]), &device))
    }

    fn name(&self) -> &'static str {
        "host"
    }
}
