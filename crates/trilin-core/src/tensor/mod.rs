//! Tensor runtime seam.
//!
//! Strided views expose contiguity and residency probes expose device
//! placement; validation inspects both.

pub mod placement;
pub mod strided;

pub use placement::{Residency, ResidencyProbe};
pub use strided::{contiguous_strides, StridedTensor};
