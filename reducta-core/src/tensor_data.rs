use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::traits::{cast_element, Element};
use crate::tensor::utils::calculate_strides;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// Wrapped in `Arc<RwLock<TensorData>>` by [`Tensor`](crate::tensor::Tensor).
/// Views share `buffer` and carry their own shape, strides and offset.
#[derive(Debug)]
pub struct TensorData {
    /// Shared storage. Views clone the `Arc`, never the data.
    pub(crate) buffer: Arc<Buffer>,
    pub(crate) device: StorageDevice,
    pub(crate) dtype: DType,

    pub(crate) shape: Vec<usize>,
    /// Element strides. A stride of 0 repeats the same element (expanded view).
    pub(crate) strides: Vec<usize>,
    /// Offset of the first element inside `buffer`.
    pub(crate) offset: usize,

    /// Optional per-axis names. `None` means the tensor is unnamed.
    pub(crate) names: Option<Vec<Option<String>>>,

    pub(crate) requires_grad: bool,
    /// Backward node of the operation that produced this tensor.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates contiguous tensor data owning `buffer`.
    ///
    /// # Errors
    /// `TensorCreationError` if the buffer length differs from the shape's element count.
    pub fn from_buffer(buffer: Buffer, shape: Vec<usize>) -> Result<Self, ReductaError> {
        let numel: usize = shape.iter().product();
        let data_len = buffer.len();
        if data_len != numel {
            return Err(ReductaError::TensorCreationError { data_len, shape });
        }
        let device = match &buffer {
            Buffer::Cpu(_) => StorageDevice::CPU,
            Buffer::Gpu { device, .. } => *device,
        };
        let strides = calculate_strides(&shape);
        Ok(TensorData {
            dtype: buffer.dtype(),
            buffer: Arc::new(buffer),
            device,
            shape,
            strides,
            offset: 0,
            names: None,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Creates a view over an existing buffer.
    ///
    /// Views carry no autograd state.
    pub(crate) fn new_view(
        buffer: Arc<Buffer>,
        device: StorageDevice,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
        names: Option<Vec<Option<String>>>,
    ) -> Self {
        TensorData {
            dtype: buffer.dtype(),
            buffer,
            device,
            shape,
            strides,
            offset,
            names,
            requires_grad: false,
            grad_fn: None,
        }
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Linear offset inside the buffer for multi-dimensional `indices`.
    pub fn get_offset(&self, indices: &[usize]) -> Result<usize, ReductaError> {
        if indices.len() != self.shape.len()
            || indices.iter().zip(&self.shape).any(|(&i, &s)| i >= s)
        {
            return Err(ReductaError::IndexOutOfBounds {
                index: indices.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(self.offset
            + indices
                .iter()
                .zip(&self.strides)
                .map(|(i, s)| i * s)
                .sum::<usize>())
    }

    /// Checks if the tensor is laid out in row-major order without gaps.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1;
        for i in (0..self.shape.len()).rev() {
            let size = self.shape[i];
            if size == 0 {
                return true;
            }
            if size != 1 {
                if self.strides[i] != expected {
                    return false;
                }
                expected *= size;
            }
        }
        true
    }

    /// Buffer offsets of every element in logical (row-major) order.
    pub(crate) fn logical_offsets(&self) -> Vec<usize> {
        let numel = self.numel();
        let mut offsets = Vec::with_capacity(numel);
        if numel == 0 {
            return offsets;
        }
        if self.is_contiguous() {
            offsets.extend(self.offset..self.offset + numel);
            return offsets;
        }
        let rank = self.shape.len();
        let mut index = vec![0usize; rank];
        let mut current = self.offset;
        for _ in 0..numel {
            offsets.push(current);
            let mut dim = rank;
            while dim > 0 {
                dim -= 1;
                index[dim] += 1;
                current += self.strides[dim];
                if index[dim] < self.shape[dim] {
                    break;
                }
                current -= self.strides[dim] * index[dim];
                index[dim] = 0;
            }
        }
        offsets
    }

    /// Copies the elements out in logical order. `T` must be the tensor's dtype.
    pub(crate) fn gather<T: Element>(&self) -> Result<Vec<T>, ReductaError> {
        let slice = self.buffer.try_get_cpu_slice::<T>()?;
        if self.is_contiguous() {
            let numel = self.numel();
            return Ok(slice[self.offset..self.offset + numel].to_vec());
        }
        Ok(self.logical_offsets().into_iter().map(|o| slice[o]).collect())
    }

    /// Copies the elements out in logical order, converting them to `T`.
    pub(crate) fn values_as<T: Element>(&self) -> Result<Vec<T>, ReductaError> {
        if self.dtype == T::DTYPE {
            return self.gather::<T>();
        }
        if self.dtype.is_complex() && !T::DTYPE.is_complex() {
            log::debug!(
                "casting {:?} to {:?} discards the imaginary part",
                self.dtype,
                T::DTYPE
            );
        }
        dispatch_dtype!(self.dtype, S => {
            let source = self.gather::<S>()?;
            Ok(source.into_iter().map(cast_element::<S, T>).collect())
        })
    }
}
