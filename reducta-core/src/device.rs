use std::fmt::Debug;

/// Represents the physical location where tensor data is stored.
///
/// Only the CPU has kernels registered. GPU tensors can be described
/// (shape, dtype, length) but every operation that needs their data
/// fails with a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Data is stored in main system memory (RAM).
    #[default]
    CPU,
    /// Data is stored on a CUDA-enabled GPU.
    GPU,
}
