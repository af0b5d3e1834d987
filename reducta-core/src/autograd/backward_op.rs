use crate::error::ReductaError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use std::fmt::Debug;
use std::sync::RwLock;

/// Backward node of a differentiable operation.
///
/// Stored in the output tensor's `grad_fn`. The crate has no graph engine:
/// callers (and [`check_grad`](crate::autograd::grad_check::check_grad)) call
/// `backward` directly with the gradient of the output.
pub trait BackwardOp: Debug + Send + Sync {
    /// Gradients with respect to each input, given the gradient of the output.
    ///
    /// The order of the returned tensors matches [`inputs`](BackwardOp::inputs),
    /// and each gradient has the shape of its input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ReductaError>;

    /// Identities of the input `TensorData` nodes used in the forward pass.
    ///
    /// The pointers are only compared, never dereferenced.
    fn inputs(&self) -> Vec<*const RwLock<TensorData>>;
}
