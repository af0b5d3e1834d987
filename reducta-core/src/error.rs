use crate::device::StorageDevice;
use crate::types::DType;
use thiserror::Error;

/// Custom error type for the reducta runtime.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum ReductaError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Invalid rank for operation {operation}: expected {expected}, got {actual}")]
    InvalidRank {
        expected: String,
        actual: usize,
        operation: String,
    },

    #[error("Dimension out of range: axis {axis} is not valid for a tensor of rank {rank}")]
    InvalidAxis { axis: isize, rank: usize },

    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument { operation: String, message: String },

    #[error("{operation} does not support dtype {dtype:?}: {message}")]
    UnsupportedDType {
        dtype: DType,
        operation: String,
        message: String,
    },

    #[error("Type mismatch in {operation}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("{operation}: {message}")]
    EmptyReduction { operation: String, message: String },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Output buffer for {operation} is undefined")]
    UndefinedOutput { operation: String },

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("No kernel registered for {op} on {device:?}")]
    KernelNotRegistered { op: String, device: StorageDevice },

    #[error("Runtime configuration was already initialized")]
    ConfigAlreadyInitialized,
}

/// Broad classification of a [`ReductaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    TypeMismatch,
    Index,
    UnsupportedOperation,
    InternalConsistency,
    Configuration,
}

impl ReductaError {
    /// Maps the error onto its taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReductaError::ShapeMismatch { .. }
            | ReductaError::InvalidRank { .. }
            | ReductaError::InvalidAxis { .. }
            | ReductaError::InvalidArgument { .. }
            | ReductaError::UnsupportedDType { .. }
            | ReductaError::TensorCreationError { .. }
            | ReductaError::DeviceMismatch { .. } => ErrorKind::Validation,
            ReductaError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ReductaError::EmptyReduction { .. } | ReductaError::IndexOutOfBounds { .. } => {
                ErrorKind::Index
            }
            ReductaError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            ReductaError::InternalError(_) | ReductaError::UndefinedOutput { .. } => {
                ErrorKind::InternalConsistency
            }
            ReductaError::KernelNotRegistered { .. } | ReductaError::ConfigAlreadyInitialized => {
                ErrorKind::Configuration
            }
        }
    }
}
