use crate::error::ReductaError;
use crate::ops::arithmetic::sub_op;
use crate::ops::reduction::axes::AxisSpec;
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::resolve::resolve_real_value_dtype;
use crate::ops::reduction::{check_out_dtype, reduce_single};
use crate::tensor::Tensor;
use crate::types::DType;

/// Vector p-norm over `axes`.
///
/// `p = 0` counts non-zero elements, `p = inf`/`-inf` take the largest/smallest
/// magnitude, any other `p` gives `(sum |x|^p)^(1/p)`. Complex inputs without
/// `dtype` or `out` produce their real counterpart. The norm of zero elements is 0.
///
/// # Errors
/// `UnsupportedDType` unless the input (or `dtype`, when given) is floating or complex.
pub fn norm_op(
    input: &Tensor,
    p: f64,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    norm_impl(input, p, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

pub fn norm_out(
    input: &Tensor,
    p: f64,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    norm_impl(input, p, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

fn norm_impl(
    input: &Tensor,
    p: f64,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let self_dtype = input.dtype();
    let checked = dtype.unwrap_or(self_dtype);
    if !(checked.is_floating_point() || checked.is_complex()) {
        return Err(ReductaError::UnsupportedDType {
            dtype: checked,
            operation: "norm".to_string(),
            message: format!(
                "norm(): input dtype should be either floating point or complex. Got {:?} instead.",
                checked
            ),
        });
    }
    check_out_dtype("norm", dtype, out)?;
    let out_dtype = resolve_real_value_dtype(self_dtype, dtype, out.dtype());
    // Complex values must reach the kernel unconverted to keep their magnitude.
    let compute = if self_dtype.is_complex() {
        dtype.unwrap_or(self_dtype)
    } else {
        out_dtype
    };
    log::trace!("norm: p={} compute={:?} out={:?}", p, compute, out_dtype);
    reduce_single(
        OpKind::Norm,
        input,
        axes,
        keepdim,
        compute,
        dtype,
        OutputSpec::new(out, out_dtype),
        &KernelArgs {
            p,
            ..KernelArgs::default()
        },
    )
}

/// p-norm of `a - b` over all elements.
///
/// # Errors
/// `TypeMismatch` if the operands differ in dtype, `ShapeMismatch` if they do
/// not broadcast, `UnsupportedDType` for non floating operands.
pub fn dist_op(a: &Tensor, b: &Tensor, p: f64) -> Result<Tensor, ReductaError> {
    let difference = sub_op(a, b)?;
    norm_op(&difference, p, &AxisSpec::All, false, None)
}
