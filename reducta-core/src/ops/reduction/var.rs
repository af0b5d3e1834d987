//! Variance and standard deviation, with or without the mean.
//!
//! `correction` is subtracted from the element count before dividing
//! (1 by default, the legacy `unbiased` flag maps to 1 or 0). Complex inputs
//! are reduced as `var(re) + var(im)` through two real reductions.

use crate::config::config;
use crate::error::ReductaError;
use crate::named::{dimnames_to_positions, propagate_names_for_reduction};
use crate::ops::arithmetic::add_op;
use crate::ops::math_elem::{complex_op, imag_op, real_op, sqrt_op};
use crate::ops::reduction::axes::{resolve_axes, AxisSet, AxisSpec};
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{build_plan, OutputBuffer, OutputSpec};
use crate::ops::reduction::resolve::get_reduction_shape;
use crate::ops::reduction::finish;
use crate::parallel::parallel_reduce;
use crate::tensor::{self, Tensor};

const DEFAULT_CORRECTION: i64 = 1;

fn correction_of(unbiased: bool) -> Option<i64> {
    Some(if unbiased { 1 } else { 0 })
}

/// Variance over `axes` with divisor `max(0, n - correction)`.
///
/// The result has the real value type of the input. Zero elements give NaN.
///
/// # Errors
/// `UnsupportedDType` unless the input is floating or complex.
pub fn var_op(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
) -> Result<Tensor, ReductaError> {
    Ok(std_var(input, axes, correction, keepdim, false, OutputBuffer::NoOutput, false)?.0)
}

/// Square root of [`var_op`].
pub fn std_op(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
) -> Result<Tensor, ReductaError> {
    Ok(std_var(input, axes, correction, keepdim, true, OutputBuffer::NoOutput, false)?.0)
}

pub fn var_out(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    Ok(std_var(input, axes, correction, keepdim, false, OutputBuffer::Existing(out), false)?.0)
}

pub fn std_out(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    Ok(std_var(input, axes, correction, keepdim, true, OutputBuffer::Existing(out), false)?.0)
}

/// `(variance, mean)` from a single pass over the lanes.
///
/// The mean keeps the input dtype (complex means are complex).
pub fn var_mean_op(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
) -> Result<(Tensor, Tensor), ReductaError> {
    with_mean(std_var(input, axes, correction, keepdim, false, OutputBuffer::NoOutput, true)?)
}

/// `(standard deviation, mean)`.
pub fn std_mean_op(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
) -> Result<(Tensor, Tensor), ReductaError> {
    with_mean(std_var(input, axes, correction, keepdim, true, OutputBuffer::NoOutput, true)?)
}

pub fn var_named(
    input: &Tensor,
    names: &[&str],
    correction: Option<i64>,
    keepdim: bool,
) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    var_op(input, &AxisSpec::List(axes), correction, keepdim)
}

pub fn std_named(
    input: &Tensor,
    names: &[&str],
    correction: Option<i64>,
    keepdim: bool,
) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    std_op(input, &AxisSpec::List(axes), correction, keepdim)
}

/// [`var_op`] with the legacy flag: `unbiased` divides by `n - 1`, otherwise by `n`.
pub fn var_unbiased(input: &Tensor, axes: &AxisSpec, unbiased: bool, keepdim: bool) -> Result<Tensor, ReductaError> {
    var_op(input, axes, correction_of(unbiased), keepdim)
}

pub fn std_unbiased(input: &Tensor, axes: &AxisSpec, unbiased: bool, keepdim: bool) -> Result<Tensor, ReductaError> {
    std_op(input, axes, correction_of(unbiased), keepdim)
}

pub fn var_mean_unbiased(
    input: &Tensor,
    axes: &AxisSpec,
    unbiased: bool,
    keepdim: bool,
) -> Result<(Tensor, Tensor), ReductaError> {
    var_mean_op(input, axes, correction_of(unbiased), keepdim)
}

pub fn std_mean_unbiased(
    input: &Tensor,
    axes: &AxisSpec,
    unbiased: bool,
    keepdim: bool,
) -> Result<(Tensor, Tensor), ReductaError> {
    std_mean_op(input, axes, correction_of(unbiased), keepdim)
}

fn with_mean((spread, mean): (Tensor, Option<Tensor>)) -> Result<(Tensor, Tensor), ReductaError> {
    let mean = mean.ok_or_else(|| ReductaError::UndefinedOutput {
        operation: "var_mean".to_string(),
    })?;
    Ok((spread, mean))
}

#[allow(clippy::too_many_arguments)]
fn std_var(
    input: &Tensor,
    axes: &AxisSpec,
    correction: Option<i64>,
    keepdim: bool,
    take_sqrt: bool,
    out: OutputBuffer<'_>,
    want_mean: bool,
) -> Result<(Tensor, Option<Tensor>), ReductaError> {
    let dtype = input.dtype();
    if !(dtype.is_floating_point() || dtype.is_complex()) {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: "std_var".to_string(),
            message: "std and var only support floating point and complex dtypes".to_string(),
        });
    }
    let result_dtype = dtype.to_real_value_type();
    if let Some(out_dtype) = out.dtype() {
        if out_dtype != result_dtype {
            return Err(ReductaError::TypeMismatch {
                expected: result_dtype,
                actual: out_dtype,
                operation: "std_var".to_string(),
            });
        }
    }
    let args = KernelArgs {
        correction: correction.unwrap_or(DEFAULT_CORRECTION),
        take_sqrt,
        ..KernelArgs::default()
    };
    let axis_set = resolve_axes(axes, input.rank())?;

    if dtype.is_complex() {
        let real_args = KernelArgs {
            take_sqrt: false,
            ..args
        };
        let (var_re, mean_re) = real_std_var(&real_op(input)?, &axis_set, keepdim, &real_args, OutputBuffer::NoOutput, want_mean)?;
        let (var_im, mean_im) = real_std_var(&imag_op(input)?, &axis_set, keepdim, &real_args, OutputBuffer::NoOutput, want_mean)?;
        let mut spread = add_op(&var_re, &var_im)?;
        if take_sqrt {
            spread = sqrt_op(&spread)?;
        }
        spread.set_names(var_re.names());
        let mean = match (mean_re, mean_im) {
            (Some(re), Some(im)) => Some(complex_op(&re, &im)?),
            _ => None,
        };
        return Ok((finish(out, spread)?, mean));
    }
    real_std_var(input, &axis_set, keepdim, &args, out, want_mean)
}

/// Variance of a real floating input, plus the mean when requested.
fn real_std_var(
    input: &Tensor,
    axes: &AxisSet,
    keepdim: bool,
    args: &KernelArgs,
    out: OutputBuffer<'_>,
    want_mean: bool,
) -> Result<(Tensor, Option<Tensor>), ReductaError> {
    let dtype = input.dtype();
    let shape = input.shape();
    let out_shape = get_reduction_shape(&shape, axes, keepdim);
    let numel = input.numel();
    if numel > 0 && out_shape.iter().product::<usize>() == 1 {
        return whole_std_var(input, axes, keepdim, args, out, want_mean);
    }
    let mut specs = vec![OutputSpec::new(out, dtype)];
    if want_mean {
        specs.push(OutputSpec::new(OutputBuffer::NoOutput, dtype));
    }
    let mut outputs = build_plan(OpKind::StdVar, input, axes, keepdim, dtype, None, &specs)?.run(args)?;
    let mean = if want_mean { outputs.pop() } else { None };
    let spread = outputs.pop().ok_or_else(|| ReductaError::UndefinedOutput {
        operation: "std_var".to_string(),
    })?;
    Ok((spread, mean))
}

/// Single-output case: a two-pass parallel reduction over the whole input.
fn whole_std_var(
    input: &Tensor,
    axes: &AxisSet,
    keepdim: bool,
    args: &KernelArgs,
    out: OutputBuffer<'_>,
    want_mean: bool,
) -> Result<(Tensor, Option<Tensor>), ReductaError> {
    let dtype = input.dtype();
    let values = input.to_vec_as::<f64>()?;
    let n = values.len();
    let grain = config().grain_size;
    log::trace!("std_var: whole-tensor reduction over {} elements", n);

    let total = parallel_reduce(0..n, grain, 0.0, |r, acc| acc + values[r].iter().sum::<f64>(), |a, b| a + b);
    let mean = total / n as f64;
    let m2 = parallel_reduce(
        0..n,
        grain,
        0.0,
        |r, acc| {
            acc + values[r]
                .iter()
                .map(|x| {
                    let d = x - mean;
                    d * d
                })
                .sum::<f64>()
        },
        |a, b| a + b,
    );
    let divisor = (n as i64 - args.correction).max(0) as f64;
    let var = m2 / divisor;
    let spread = if args.take_sqrt { var.sqrt() } else { var };

    let shape = get_reduction_shape(&input.shape(), axes, keepdim);
    let names = propagate_names_for_reduction(&input.names(), axes, keepdim);
    let result = tensor::full(&shape, spread, dtype)?;
    result.set_names(names.clone());
    let mean_tensor = if want_mean {
        let m = tensor::full(&shape, mean, dtype)?;
        m.set_names(names);
        Some(m)
    } else {
        None
    };
    Ok((finish(out, result)?, mean_tensor))
}

#[cfg(test)]
#[path = "var_test.rs"]
mod tests;
