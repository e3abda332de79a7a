//! Strided tensor views.
//!
//! burn tensors are logically dense; the layout of the storage they view is
//! private to each backend. [`StridedTensor`] pairs a burn tensor with the
//! storage strides and offset of the view it was produced from, which makes
//! contiguity an inspectable property.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Tensor together with the strided layout of its storage view.
///
/// # Type Parameters
/// * `B` - The burn backend
/// * `D` - The tensor rank
///
/// # Examples
/// ```rust
/// use trilin_core::tensor::StridedTensor;
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let t = StridedTensor::new(Tensor::<Backend, 2>::zeros([4, 3], &device));
/// assert!(t.is_contiguous());
/// assert!(!t.swap_dims(0, 1).is_contiguous());
/// ```
#[derive(Debug, Clone)]
pub struct StridedTensor<B: Backend, const D: usize> {
    data: Tensor<B, D>,
    /// Element strides of the storage view, per dimension.
    strides: [usize; D],
    /// Element offset of the first value within storage.
    offset: usize,
}

impl<B: Backend, const D: usize> StridedTensor<B, D> {
    /// Wrap a freshly allocated tensor; the layout is row-major contiguous.
    pub fn new(data: Tensor<B, D>) -> Self {
        let strides = contiguous_strides(&data.dims());
        Self {
            data,
            strides,
            offset: 0,
        }
    }

    /// Get the tensor values.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Consume the view and return the tensor values.
    pub fn into_tensor(self) -> Tensor<B, D> {
        self.data
    }

    /// Logical shape.
    pub fn dims(&self) -> [usize; D] {
        self.data.dims()
    }

    /// Storage strides, in elements.
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Storage offset, in elements.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Device holding the storage.
    pub fn device(&self) -> B::Device {
        self.data.device()
    }

    /// Whether the view covers its elements row-major without gaps.
    ///
    /// Dimensions of extent 1 never break contiguity, and an empty tensor is
    /// always contiguous.
    pub fn is_contiguous(&self) -> bool {
        let dims = self.dims();
        if dims.iter().any(|&d| d == 0) {
            return true;
        }
        let mut expected = 1;
        for axis in (0..D).rev() {
            if dims[axis] == 1 {
                continue;
            }
            if self.strides[axis] != expected {
                return false;
            }
            expected *= dims[axis];
        }
        true
    }

    /// Swap two dimensions without moving storage.
    pub fn swap_dims(self, dim1: usize, dim2: usize) -> Self {
        let mut strides = self.strides;
        strides.swap(dim1, dim2);
        Self {
            data: self.data.swap_dims(dim1, dim2),
            strides,
            offset: self.offset,
        }
    }

    /// Restrict `dim` to `length` elements starting at `start`, sharing storage.
    pub fn narrow(self, dim: usize, start: usize, length: usize) -> Self {
        let offset = self.offset + start * self.strides[dim];
        Self {
            data: self.data.narrow(dim, start, length),
            strides: self.strides,
            offset,
        }
    }

    /// Return a contiguous view, materialising a copy only when needed.
    pub fn contiguous(self) -> Self {
        if self.is_contiguous() {
            self
        } else {
            Self::new(self.data)
        }
    }

    /// Move the values to `device` as a new contiguous allocation.
    pub fn to_device(self, device: &B::Device) -> Self {
        Self::new(self.data.to_device(device))
    }
}

impl<B: Backend, const D: usize> From<Tensor<B, D>> for StridedTensor<B, D> {
    fn from(data: Tensor<B, D>) -> Self {
        Self::new(data)
    }
}

/// Row-major strides for `dims`.
pub fn contiguous_strides<const D: usize>(dims: &[usize; D]) -> [usize; D] {
    let mut strides = [0; D];
    let mut acc = 1;
    for axis in (0..D).rev() {
        strides[axis] = acc;
        acc *= dims[axis];
    }
    strides
}
