//! Array factory: every tensor the operators allocate comes from here.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::traits::Element;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Allocates a tensor of `shape` and `dtype` on `device`.
///
/// CPU tensors are zero-filled. Device tensors only record their length.
pub fn empty(shape: &[usize], dtype: DType, device: StorageDevice) -> Result<Tensor, ReductaError> {
    match device {
        StorageDevice::CPU => full(shape, 0.0, dtype),
        StorageDevice::GPU => {
            let len = shape.iter().product();
            let buffer = Buffer::Gpu { device, dtype, len };
            Ok(Tensor::from_data(TensorData::from_buffer(buffer, shape.to_vec())?))
        }
    }
}

/// Creates a CPU tensor filled with `value` converted to `dtype`.
pub fn full(shape: &[usize], value: f64, dtype: DType) -> Result<Tensor, ReductaError> {
    let numel = shape.iter().product();
    dispatch_dtype!(dtype, T => {
        Tensor::from_vec(vec![T::of_f64(value); numel], shape.to_vec())
    })
}

pub fn zeros(shape: &[usize], dtype: DType) -> Result<Tensor, ReductaError> {
    full(shape, 0.0, dtype)
}

pub fn ones(shape: &[usize], dtype: DType) -> Result<Tensor, ReductaError> {
    full(shape, 1.0, dtype)
}

/// Zero tensor with the shape, dtype and device of `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, ReductaError> {
    let (shape, dtype, device) = {
        let guard = tensor.read_data();
        (guard.shape.clone(), guard.dtype, guard.device)
    };
    empty(&shape, dtype, device)
}

/// Uniform samples in `[0, 1)`. Only floating dtypes are accepted.
pub fn rand(shape: &[usize], dtype: DType) -> Result<Tensor, ReductaError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    dispatch_float!(dtype, T => {
        let data: Vec<T> = (0..numel).map(|_| T::of_f64(rng.gen::<f64>())).collect();
        Tensor::from_vec(data, shape.to_vec())
    }, "rand")
}

/// Standard normal samples. Only floating dtypes are accepted.
pub fn randn(shape: &[usize], dtype: DType) -> Result<Tensor, ReductaError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    dispatch_float!(dtype, T => {
        let data: Vec<T> = (0..numel)
            .map(|_| {
                let sample: f64 = StandardNormal.sample(&mut rng);
                T::of_f64(sample)
            })
            .collect();
        Tensor::from_vec(data, shape.to_vec())
    }, "randn")
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
