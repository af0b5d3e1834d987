use crate::error::ReductaError;
use crate::named::dimnames_to_positions;
use crate::ops::reduction::axes::AxisSpec;
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::reduce_single;
use crate::ops::reduction::resolve::resolve_dtype;
use crate::tensor::Tensor;
use crate::types::DType;

/// Sum over `axes`.
///
/// Integral inputs (bool included) accumulate in `I64` unless `dtype` or an
/// existing output says otherwise. The sum over zero elements is 0.
pub fn sum_op(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    sum_impl(OpKind::Sum, input, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

/// [`sum_op`] writing into `out`, which is resized to the reduction shape.
///
/// # Errors
/// `TypeMismatch` if `dtype` is given and `out` has another dtype.
pub fn sum_out(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    sum_impl(OpKind::Sum, input, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

pub fn sum_named(
    input: &Tensor,
    names: &[&str],
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    sum_op(input, &AxisSpec::List(axes), keepdim, dtype)
}

/// Sum treating NaN as zero. Integral inputs behave exactly like [`sum_op`].
///
/// # Errors
/// `UnsupportedDType` for complex inputs.
pub fn nansum_op(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    nansum_impl(input, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

pub fn nansum_out(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    nansum_impl(input, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

fn nansum_impl(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let self_dtype = input.dtype();
    if self_dtype.is_complex() {
        return Err(ReductaError::UnsupportedDType {
            dtype: self_dtype,
            operation: "nansum".to_string(),
            message: "nansum does not support complex inputs".to_string(),
        });
    }
    let op = if self_dtype.is_integral(true) {
        OpKind::Sum
    } else {
        OpKind::NanSum
    };
    sum_impl(op, input, axes, keepdim, dtype, out)
}

fn sum_impl(
    op: OpKind,
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let compute = resolve_dtype(input.dtype(), dtype, out.dtype(), true);
    reduce_single(
        op,
        input,
        axes,
        keepdim,
        compute,
        dtype,
        OutputSpec::new(out, compute),
        &KernelArgs::default(),
    )
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
