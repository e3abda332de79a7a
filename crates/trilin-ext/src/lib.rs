//! Registration surface for the trilinear interpolation operators.
//!
//! Publishes `trilinear_interpolation_fw(feats, points)` and
//! `trilinear_interpolation_bw(dL_dfeat_interp, feats, points)` through an
//! [`ExtensionModule`] built at startup.

pub mod error;
pub mod operand;
pub mod registry;

pub use error::{BindingError, Result};
pub use operand::Operand;
pub use registry::{Entry, EntryFn, ExtensionModule, BACKWARD, FORWARD, MODULE_DOC, MODULE_NAME};
