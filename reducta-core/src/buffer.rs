use std::fmt::Debug;
use std::sync::Arc;

use num_complex::Complex;

use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::traits::Element;
use crate::types::DType;

/// Enum representing different buffer types based on device and data type.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Data resides on the CPU.
    Cpu(CpuBuffer),
    /// Placeholder for a device buffer. Only its length is tracked; no kernel
    /// can read it.
    Gpu {
        device: StorageDevice,
        dtype: DType,
        len: usize,
    },
}

/// CPU storage, one variant per element type.
#[derive(Debug, Clone)]
pub enum CpuBuffer {
    Bool(Arc<Vec<bool>>),
    U8(Arc<Vec<u8>>),
    I32(Arc<Vec<i32>>),
    I64(Arc<Vec<i64>>),
    F32(Arc<Vec<f32>>),
    F64(Arc<Vec<f64>>),
    Complex64(Arc<Vec<Complex<f32>>>),
    Complex128(Arc<Vec<Complex<f64>>>),
}

impl CpuBuffer {
    pub fn dtype(&self) -> DType {
        match self {
            CpuBuffer::Bool(_) => DType::Bool,
            CpuBuffer::U8(_) => DType::U8,
            CpuBuffer::I32(_) => DType::I32,
            CpuBuffer::I64(_) => DType::I64,
            CpuBuffer::F32(_) => DType::F32,
            CpuBuffer::F64(_) => DType::F64,
            CpuBuffer::Complex64(_) => DType::Complex64,
            CpuBuffer::Complex128(_) => DType::Complex128,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CpuBuffer::Bool(v) => v.len(),
            CpuBuffer::U8(v) => v.len(),
            CpuBuffer::I32(v) => v.len(),
            CpuBuffer::I64(v) => v.len(),
            CpuBuffer::F32(v) => v.len(),
            CpuBuffer::F64(v) => v.len(),
            CpuBuffer::Complex64(v) => v.len(),
            CpuBuffer::Complex128(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Buffer {
    /// Wraps a typed vector into a CPU buffer.
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        Buffer::Cpu(T::into_cpu_buffer(data))
    }

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::Cpu(cpu) => cpu.dtype(),
            Buffer::Gpu { dtype, .. } => *dtype,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::Cpu(cpu) => cpu.len(),
            Buffer::Gpu { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the CPU storage, or `DeviceMismatch` for device buffers.
    pub fn try_get_cpu(&self) -> Result<&CpuBuffer, ReductaError> {
        match self {
            Buffer::Cpu(cpu) => Ok(cpu),
            Buffer::Gpu { device, .. } => Err(ReductaError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: *device,
                operation: "try_get_cpu".to_string(),
            }),
        }
    }

    /// Borrows the CPU storage as a slice of `T`.
    ///
    /// Fails if the buffer lives on another device or holds another element type.
    pub fn try_get_cpu_slice<T: Element>(&self) -> Result<&[T], ReductaError> {
        let cpu = self.try_get_cpu()?;
        T::cpu_slice(cpu).ok_or_else(|| ReductaError::TypeMismatch {
            expected: T::DTYPE,
            actual: cpu.dtype(),
            operation: "try_get_cpu_slice".to_string(),
        })
    }
}
