//! Validated trilinear interpolation operators.
//!
//! [`Trilinear`] checks that every input tensor is contiguous and resident on
//! the expected device, then dispatches to a [`TrilinearKernel`] executor.

pub mod error;
pub mod tensor;
pub mod config;
pub mod validation;
pub mod kernel;
pub mod grid;
pub mod operator;

pub use config::TrilinearConfig;
pub use error::{Result, TensorProperty, TrilinearError};
pub use grid::{gather_corners, scatter_corners, CornerSample, CORNERS};
pub use kernel::{HostKernel, TensorOpsKernel, TrilinearKernel};
pub use operator::Trilinear;
pub use tensor::{Residency, ResidencyProbe, StridedTensor};
