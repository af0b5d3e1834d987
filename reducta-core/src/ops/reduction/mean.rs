use crate::error::ReductaError;
use crate::named::dimnames_to_positions;
use crate::ops::arithmetic::{div_op, div_scalar_op};
use crate::ops::math_elem::map_elements;
use crate::ops::reduction::axes::{resolve_axes, AxisSpec};
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::resolve::resolve_dtype;
use crate::ops::reduction::sum::{nansum_op, sum_op};
use crate::ops::reduction::{check_out_dtype, finish, reduce_single, reduced_count};
use crate::ops::traits::Element;
use crate::tensor::Tensor;
use crate::types::DType;

/// Arithmetic mean over `axes`.
///
/// Computed as the sum in the result dtype divided by the number of reduced
/// elements, so the mean of zero elements is NaN.
///
/// # Errors
/// `UnsupportedDType` when the result dtype (explicit, from `out`, or the
/// input's) is neither floating nor complex.
pub fn mean_op(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    mean_impl(input, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

pub fn mean_out(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    mean_impl(input, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

pub fn mean_named(
    input: &Tensor,
    names: &[&str],
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    mean_op(input, &AxisSpec::List(axes), keepdim, dtype)
}

fn mean_impl(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    check_out_dtype("mean", dtype, out)?;
    let resolved = resolve_dtype(input.dtype(), dtype, out.dtype(), false);
    if !(resolved.is_floating_point() || resolved.is_complex()) {
        return Err(ReductaError::UnsupportedDType {
            dtype: resolved,
            operation: "mean".to_string(),
            message: "mean is only implemented for floating and complex types".to_string(),
        });
    }
    let axis_set = resolve_axes(axes, input.rank())?;
    let count = reduced_count(&input.shape(), &axis_set);
    let total = reduce_single(
        OpKind::Sum,
        input,
        axes,
        keepdim,
        resolved,
        Some(resolved),
        OutputSpec::new(OutputBuffer::NoOutput, resolved),
        &KernelArgs::default(),
    )?;
    finish(out, div_scalar_op(&total, count as f64)?)
}

/// Mean over the non-NaN elements. A lane made only of NaN gives NaN.
///
/// # Errors
/// `UnsupportedDType` unless the input is a real floating type.
pub fn nanmean_op(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    nanmean_impl(input, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

pub fn nanmean_out(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    nanmean_impl(input, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

fn nanmean_impl(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let self_dtype = input.dtype();
    if !self_dtype.is_floating_point() {
        return Err(ReductaError::UnsupportedDType {
            dtype: self_dtype,
            operation: "nanmean".to_string(),
            message: format!(
                "nanmean(): expected input to have floating point dtype but got {:?}",
                self_dtype
            ),
        });
    }
    check_out_dtype("nanmean", dtype, out)?;
    let resolved = resolve_dtype(self_dtype, dtype, out.dtype(), false);
    let present = dispatch_float!(self_dtype, T => {
        map_elements(input, |x: T| !x.is_nan_value())?
    }, "nanmean");
    let count = sum_op(&present, axes, keepdim, Some(resolved))?;
    let total = nansum_op(input, axes, keepdim, Some(resolved))?;
    let mean = div_op(&total, &count)?;
    mean.set_names(total.names());
    finish(out, mean)
}

#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
