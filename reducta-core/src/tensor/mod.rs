use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::traits::Element;
use crate::tensor_data::TensorData;
use crate::types::DType;
use num_complex::Complex;
use std::sync::{Arc, RwLock};

pub mod create;
mod cumulative_methods;
mod reduction_methods;
mod traits;
pub mod utils;
mod view_methods;

pub use create::{empty, full, ones, rand, randn, zeros, zeros_like};

/// Represents a multi-dimensional array (tensor).
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally: clones are cheap and
/// share the same data, and the plan builder can resize a caller-supplied
/// output through any of its handles.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    pub(crate) fn from_data(data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Creates a tensor from a typed vector laid out in row-major order.
    ///
    /// # Errors
    /// `TensorCreationError` if `data.len()` does not match the shape.
    pub fn from_vec<T: Element>(data: Vec<T>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        let tensor_data = TensorData::from_buffer(Buffer::from_vec(data), shape)?;
        Ok(Tensor::from_data(tensor_data))
    }

    /// Creates a new f32 tensor on the CPU.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_f64(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_i32(data: Vec<i32>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_i64(data: Vec<i64>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_u8(data: Vec<u8>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_bool(data: Vec<bool>, shape: Vec<usize>) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_complex64(
        data: Vec<Complex<f32>>,
        shape: Vec<usize>,
    ) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    pub fn new_complex128(
        data: Vec<Complex<f64>>,
        shape: Vec<usize>,
    ) -> Result<Self, ReductaError> {
        Tensor::from_vec(data, shape)
    }

    /// Creates a rank-0 tensor holding `value`.
    pub fn scalar<T: Element>(value: T) -> Self {
        Tensor::from_data(TensorData {
            buffer: Arc::new(Buffer::from_vec(vec![value])),
            device: StorageDevice::CPU,
            dtype: T::DTYPE,
            shape: Vec::new(),
            strides: Vec::new(),
            offset: 0,
            names: None,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Acquires a read lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    pub fn rank(&self) -> usize {
        self.read_data().rank()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Per-axis names, `None` for an unnamed tensor.
    pub fn names(&self) -> Option<Vec<Option<String>>> {
        self.read_data().names.clone()
    }

    /// Attaches per-axis names.
    ///
    /// # Errors
    /// `InvalidArgument` if the number of names differs from the rank or a name repeats.
    pub fn with_names(self, names: &[Option<&str>]) -> Result<Self, ReductaError> {
        {
            let mut guard = self.write_data();
            if names.len() != guard.rank() {
                return Err(ReductaError::InvalidArgument {
                    operation: "with_names".to_string(),
                    message: format!(
                        "got {} names for a tensor of rank {}",
                        names.len(),
                        guard.rank()
                    ),
                });
            }
            for (i, name) in names.iter().enumerate() {
                if name.is_some() && names[..i].contains(name) {
                    return Err(ReductaError::InvalidArgument {
                        operation: "with_names".to_string(),
                        message: format!("duplicate dimension name {:?}", name),
                    });
                }
            }
            guard.names = if names.iter().all(|n| n.is_none()) {
                None
            } else {
                Some(names.iter().map(|n| n.map(str::to_string)).collect())
            };
        }
        Ok(self)
    }

    /// Replaces the names in place. The caller guarantees the length matches the rank.
    pub(crate) fn set_names(&self, names: Option<Vec<Option<String>>>) {
        self.write_data().names = names;
    }

    /// Attaches the backward node and marks the tensor as requiring grad.
    pub(crate) fn set_grad_fn(&self, grad_fn: Arc<dyn crate::autograd::BackwardOp + Send + Sync>) {
        let mut guard = self.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag.
    ///
    /// # Errors
    /// `UnsupportedOperation` when enabling gradients on a non-floating tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), ReductaError> {
        let mut guard = self.write_data();
        if requires_grad && !(guard.dtype.is_floating_point() || guard.dtype.is_complex()) {
            return Err(ReductaError::UnsupportedOperation(format!(
                "only floating point and complex tensors can require gradients, got {:?}",
                guard.dtype
            )));
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// The backward node attached by the operation that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn crate::autograd::BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    /// A new handle on the same data without autograd state.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_data(TensorData::new_view(
            Arc::clone(&guard.buffer),
            guard.device,
            guard.offset,
            guard.shape.clone(),
            guard.strides.clone(),
            guard.names.clone(),
        ))
    }

    /// Copies the elements out in logical order.
    ///
    /// # Errors
    /// `TypeMismatch` if `T` is not the tensor's dtype, `DeviceMismatch` for non-CPU data.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, ReductaError> {
        self.read_data().gather::<T>()
    }

    /// Copies the elements out in logical order converted to `T`.
    pub fn to_vec_as<T: Element>(&self) -> Result<Vec<T>, ReductaError> {
        self.read_data().values_as::<T>()
    }

    /// Extracts the value of a single-element tensor, converted to `T`.
    pub fn item<T: Element>(&self) -> Result<T, ReductaError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(ReductaError::ShapeMismatch {
                expected: vec![],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        let values = guard.values_as::<T>()?;
        Ok(values[0])
    }
}
