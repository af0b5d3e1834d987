use std::sync::{Arc, RwLock};

use crate::autograd::backward::value_selecting_reduction_backward;
use crate::autograd::BackwardOp;
use crate::error::ReductaError;
use crate::ops::reduction::axes::{resolve_axes, AxisSet, AxisSpec};
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{build_plan, OutputBuffer, OutputSpec};
use crate::ops::reduction::reduce_single;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Backward context for `max_dim`/`min_dim`.
///
/// The gradient flows only to the selected element of each lane.
#[derive(Debug)]
struct ValueSelectingBackward {
    input_node: Arc<RwLock<TensorData>>,
    dim: isize,
    indices: Tensor,
    sizes: Vec<usize>,
    keepdim: bool,
}

impl BackwardOp for ValueSelectingBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ReductaError> {
        let grad = value_selecting_reduction_backward(
            grad_output,
            self.dim,
            &self.indices,
            &self.sizes,
            self.keepdim,
        )?;
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<*const RwLock<TensorData>> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}

/// Complex values have no order.
fn check_ordered(input: &Tensor, operation: &str) -> Result<DType, ReductaError> {
    let dtype = input.dtype();
    if dtype.is_complex() {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: operation.to_string(),
            message: format!("{} is not supported for complex inputs", operation),
        });
    }
    Ok(dtype)
}

fn check_out_matches_input(
    operation: &str,
    input_dtype: DType,
    out: OutputBuffer<'_>,
) -> Result<(), ReductaError> {
    match out.dtype() {
        Some(out_dtype) if out_dtype != input_dtype => Err(ReductaError::TypeMismatch {
            expected: input_dtype,
            actual: out_dtype,
            operation: format!(
                "{}: Expected the dtype for input and out to match, but got {:?} for input's dtype and {:?} for out's dtype.",
                operation, input_dtype, out_dtype
            ),
        }),
        _ => Ok(()),
    }
}

/// Largest value over `axes`; NaN propagates.
///
/// # Errors
/// `EmptyReduction` if a reduced axis has size 0.
pub fn amax_op(input: &Tensor, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
    extreme_impl(OpKind::MaxValues, input, axes, keepdim, OutputBuffer::NoOutput)
}

/// # Errors
/// `TypeMismatch` if `out` has a different dtype than `input`.
pub fn amax_out(input: &Tensor, axes: &AxisSpec, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    extreme_impl(OpKind::MaxValues, input, axes, keepdim, OutputBuffer::Existing(out))
}

/// Smallest value over `axes`; NaN propagates.
pub fn amin_op(input: &Tensor, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
    extreme_impl(OpKind::MinValues, input, axes, keepdim, OutputBuffer::NoOutput)
}

pub fn amin_out(input: &Tensor, axes: &AxisSpec, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    extreme_impl(OpKind::MinValues, input, axes, keepdim, OutputBuffer::Existing(out))
}

fn extreme_impl(
    op: OpKind,
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let dtype = check_ordered(input, op.name())?;
    check_out_matches_input(op.name(), dtype, out)?;
    reduce_single(
        op,
        input,
        axes,
        keepdim,
        dtype,
        None,
        OutputSpec::new(out, dtype),
        &KernelArgs::default(),
    )
}

/// Minimum and maximum in one pass, returned as `(min, max)`.
///
/// Without `dim` the whole tensor is reduced and the input must not be empty.
pub fn aminmax_op(input: &Tensor, dim: Option<isize>, keepdim: bool) -> Result<(Tensor, Tensor), ReductaError> {
    aminmax_impl(input, dim, keepdim, OutputBuffer::NoOutput, OutputBuffer::NoOutput)
}

pub fn aminmax_out(
    input: &Tensor,
    dim: Option<isize>,
    keepdim: bool,
    min: &Tensor,
    max: &Tensor,
) -> Result<(Tensor, Tensor), ReductaError> {
    aminmax_impl(input, dim, keepdim, OutputBuffer::Existing(min), OutputBuffer::Existing(max))
}

fn aminmax_impl(
    input: &Tensor,
    dim: Option<isize>,
    keepdim: bool,
    min: OutputBuffer<'_>,
    max: OutputBuffer<'_>,
) -> Result<(Tensor, Tensor), ReductaError> {
    let dtype = check_ordered(input, "aminmax")?;
    check_out_matches_input("aminmax", dtype, min)?;
    check_out_matches_input("aminmax", dtype, max)?;
    let rank = input.rank();
    let axes = match dim {
        Some(d) => resolve_axes(&AxisSpec::Single(d), rank)?,
        None => {
            if input.numel() == 0 {
                return Err(ReductaError::EmptyReduction {
                    operation: "aminmax".to_string(),
                    message: "cannot compute aminmax over an empty dimension as the operation has no identity"
                        .to_string(),
                });
            }
            AxisSet::full(rank)
        }
    };
    let specs = [OutputSpec::new(min, dtype), OutputSpec::new(max, dtype)];
    let mut outputs = build_plan(OpKind::AminMax, input, &axes, keepdim, dtype, None, &specs)?
        .run(&KernelArgs::default())?;
    match (outputs.pop(), outputs.pop()) {
        (Some(max), Some(min)) => Ok((min, max)),
        _ => Err(ReductaError::UndefinedOutput {
            operation: "aminmax".to_string(),
        }),
    }
}

/// Largest value along `dim` and its index (the first one on ties).
///
/// The values carry a backward node when `input` requires grad.
pub fn max_dim(input: &Tensor, dim: isize, keepdim: bool) -> Result<(Tensor, Tensor), ReductaError> {
    value_selecting(OpKind::MaxValues, OpKind::ArgMax, input, dim, keepdim)
}

/// Smallest value along `dim` and its index.
pub fn min_dim(input: &Tensor, dim: isize, keepdim: bool) -> Result<(Tensor, Tensor), ReductaError> {
    value_selecting(OpKind::MinValues, OpKind::ArgMin, input, dim, keepdim)
}

fn value_selecting(
    values_op: OpKind,
    index_op: OpKind,
    input: &Tensor,
    dim: isize,
    keepdim: bool,
) -> Result<(Tensor, Tensor), ReductaError> {
    let dtype = check_ordered(input, values_op.name())?;
    let axes = AxisSpec::Single(dim);
    let args = KernelArgs::default();
    let values = reduce_single(
        values_op,
        input,
        &axes,
        keepdim,
        dtype,
        None,
        OutputSpec::new(OutputBuffer::NoOutput, dtype),
        &args,
    )?;
    let indices = reduce_single(
        index_op,
        input,
        &axes,
        keepdim,
        dtype,
        None,
        OutputSpec::new(OutputBuffer::NoOutput, DType::I64),
        &args,
    )?;
    if input.requires_grad() {
        values.set_grad_fn(Arc::new(ValueSelectingBackward {
            input_node: Arc::clone(&input.data),
            dim,
            indices: indices.clone(),
            sizes: input.shape(),
            keepdim,
        }));
    }
    Ok((values, indices))
}

#[cfg(test)]
#[path = "max_test.rs"]
mod tests;
