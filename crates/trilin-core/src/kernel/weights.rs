//! Trilinear corner weights.
//!
//! A local coordinate `p` in `[-1, 1]` maps to `t = (p + 1) / 2`; the low
//! corner along that axis gets `1 - t` and the high corner `t`. The weight of
//! corner `c = 4i + 2j + k` is the product of its three axis weights.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::grid::CORNERS;

/// Corner weights for every point: `[N, 3]` to `[N, 8]`.
pub fn corner_weights<B: Backend>(points: Tensor<B, 2>) -> Tensor<B, 2> {
    let [n, _] = points.dims();
    let device = points.device();

    let t = (points + 1.0) * 0.5;
    let one = Tensor::<B, 2>::ones([n, 1], &device);

    let axis = |a: usize| {
        let hi = t.clone().narrow(1, a, 1);
        [one.clone() - hi.clone(), hi]
    };
    let [x, y, z] = [axis(0), axis(1), axis(2)];

    let mut columns = Vec::with_capacity(CORNERS);
    for wx in &x {
        for wy in &y {
            for wz in &z {
                columns.push(wx.clone() * wy.clone() * wz.clone());
            }
        }
    }
    Tensor::cat(columns, 1)
}

/// Corner weights of a single point on the host.
#[inline]
pub(crate) fn corner_weights_host(point: &[f64]) -> [f64; CORNERS] {
    let t = [
        (point[0] + 1.0) * 0.5,
        (point[1] + 1.0) * 0.5,
        (point[2] + 1.0) * 0.5,
    ];
    let mut weights = [0.0; CORNERS];
    for (c, weight) in weights.iter_mut().enumerate() {
        let pick = |axis: usize, bit: usize| {
            if c & bit == 0 {
                1.0 - t[axis]
            } else {
                t[axis]
            }
        };
        *weight = pick(0, 4) * pick(1, 2) * pick(2, 1);
    }
    weights
}
