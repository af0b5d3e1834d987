use std::sync::{Arc, RwLock};

use crate::autograd::backward::cummaxmin_backward;
use crate::autograd::BackwardOp;
use crate::error::ReductaError;
use crate::named::dimname_to_position;
use crate::ops::cumulative::run_scan;
use crate::ops::reduction::dispatch::OpKind;
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Backward context for `cummax`/`cummin`: routes each gradient to the
/// position its running extreme came from.
#[derive(Debug)]
struct CummaxminBackward {
    input_node: Arc<RwLock<TensorData>>,
    input: Tensor,
    indices: Tensor,
    dim: isize,
}

impl BackwardOp for CummaxminBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ReductaError> {
        Ok(vec![cummaxmin_backward(grad_output, &self.input, &self.indices, self.dim)?])
    }

    fn inputs(&self) -> Vec<*const RwLock<TensorData>> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}

/// Running maximum along `dim` and the `I64` index where it was taken.
///
/// A NaN becomes the running value and stays there. Ties move the index to
/// the later position.
///
/// # Errors
/// `UnsupportedDType` for complex input, checked before any caller buffer is touched.
pub fn cummax_op(input: &Tensor, dim: isize) -> Result<(Tensor, Tensor), ReductaError> {
    running_extreme(OpKind::CumMax, input, dim, OutputBuffer::NoOutput, OutputBuffer::NoOutput)
}

/// # Errors
/// `TypeMismatch` if `values` does not have the input dtype or `indices` is not `I64`.
pub fn cummax_out(
    input: &Tensor,
    dim: isize,
    values: &Tensor,
    indices: &Tensor,
) -> Result<(Tensor, Tensor), ReductaError> {
    running_extreme(
        OpKind::CumMax,
        input,
        dim,
        OutputBuffer::Existing(values),
        OutputBuffer::Existing(indices),
    )
}

pub fn cummax_named(input: &Tensor, name: &str) -> Result<(Tensor, Tensor), ReductaError> {
    cummax_op(input, dimname_to_position(input, name)?)
}

/// Running minimum along `dim`; see [`cummax_op`].
pub fn cummin_op(input: &Tensor, dim: isize) -> Result<(Tensor, Tensor), ReductaError> {
    running_extreme(OpKind::CumMin, input, dim, OutputBuffer::NoOutput, OutputBuffer::NoOutput)
}

pub fn cummin_out(
    input: &Tensor,
    dim: isize,
    values: &Tensor,
    indices: &Tensor,
) -> Result<(Tensor, Tensor), ReductaError> {
    running_extreme(
        OpKind::CumMin,
        input,
        dim,
        OutputBuffer::Existing(values),
        OutputBuffer::Existing(indices),
    )
}

pub fn cummin_named(input: &Tensor, name: &str) -> Result<(Tensor, Tensor), ReductaError> {
    cummin_op(input, dimname_to_position(input, name)?)
}

fn running_extreme(
    op: OpKind,
    input: &Tensor,
    dim: isize,
    values_out: OutputBuffer<'_>,
    indices_out: OutputBuffer<'_>,
) -> Result<(Tensor, Tensor), ReductaError> {
    let dtype = input.dtype();
    if dtype.is_complex() {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: op.name().to_string(),
            message: format!("{} is not implemented for complex types", op.name()),
        });
    }
    let specs = [OutputSpec::new(values_out, dtype), OutputSpec::new(indices_out, DType::I64)];
    let mut outputs = run_scan(op, input, dim, dtype, None, &specs)?;
    let missing = || ReductaError::UndefinedOutput {
        operation: op.name().to_string(),
    };
    let indices = outputs.pop().ok_or_else(missing)?;
    let values = outputs.pop().ok_or_else(missing)?;
    if input.requires_grad() && matches!(values_out, OutputBuffer::NoOutput) {
        values.set_grad_fn(Arc::new(CummaxminBackward {
            input_node: Arc::clone(&input.data),
            input: input.detach(),
            indices: indices.detach(),
            dim,
        }));
    }
    Ok((values, indices))
}
