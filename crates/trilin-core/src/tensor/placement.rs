//! Device residency probes.
//!
//! burn's `Backend` does not say whether a device is backed by host memory or
//! by an accelerator, so backends used with the operators implement
//! [`ResidencyProbe`].

use burn::backend::Autodiff;
use burn::tensor::backend::Backend;
use burn_ndarray::{NdArray, NdArrayDevice};
use serde::{Deserialize, Serialize};

/// Where a device keeps tensor storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Residency {
    /// System memory.
    Host,
    /// Accelerator (GPU) memory.
    Accelerator,
}

impl Residency {
    /// True for accelerator-resident storage.
    pub fn is_accelerator(self) -> bool {
        matches!(self, Self::Accelerator)
    }
}

/// Backend extension reporting the residency of its devices.
pub trait ResidencyProbe: Backend {
    /// Residency of tensors allocated on `device`.
    fn residency(device: &Self::Device) -> Residency;
}

impl ResidencyProbe for NdArray<f32> {
    fn residency(_device: &NdArrayDevice) -> Residency {
        Residency::Host
    }
}

impl ResidencyProbe for NdArray<f64> {
    fn residency(_device: &NdArrayDevice) -> Residency {
        Residency::Host
    }
}

impl<B: ResidencyProbe> ResidencyProbe for Autodiff<B> {
    fn residency(device: &Self::Device) -> Residency {
        B::residency(device)
    }
}

#[cfg(feature = "wgpu")]
impl ResidencyProbe for burn::backend::Wgpu {
    fn residency(device: &Self::Device) -> Residency {
        use burn::backend::wgpu::WgpuDevice;
        match device {
            WgpuDevice::Cpu => Residency::Host,
            _ => Residency::Accelerator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndarray_is_host() {
        let device = NdArrayDevice::Cpu;
        assert_eq!(<NdArray<f32> as ResidencyProbe>::residency(&device), Residency::Host);
        assert!(!<Autodiff<NdArray<f64>> as ResidencyProbe>::residency(&device).is_accelerator());
    }
}
