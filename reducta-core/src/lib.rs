//! Dimension-wise reductions, running scans and their gradient formulas for a
//! CPU tensor runtime.
//!
//! Every reduction goes through the same pipeline: the axis spec is resolved,
//! the output dtype and shape are inferred, an iteration plan is built (or a
//! fast path finishes the call) and a kernel looked up by operation and device
//! fills the output.

// Macros first: the modules below use them.
#[macro_use]
mod macros;

pub mod autograd;
pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod named;
pub mod ops;
pub mod parallel;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use device::StorageDevice;
pub use error::ReductaError;
pub use tensor::Tensor;
pub use types::DType;
// Re-export traits required by public functions/structs
pub use num_traits;
