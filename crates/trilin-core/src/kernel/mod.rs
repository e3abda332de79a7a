//! Kernel executors.
//!
//! This module provides the executor trait the operators dispatch to, the
//! corner weighting shared by every executor, and two implementations.

pub mod trait_;
pub mod weights;
pub mod tensor_ops;
pub mod host;

pub use trait_::TrilinearKernel;
pub use weights::corner_weights;
pub use tensor_ops::TensorOpsKernel;
pub use host::HostKernel;
