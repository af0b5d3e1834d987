//! Running (scan) kernels. Every output has the input's shape.

use num_traits::Float;

use crate::error::ReductaError;
use crate::ops::kernels::scan_lanes;
use crate::ops::reduction::dispatch::KernelArgs;
use crate::ops::reduction::plan::IterationPlan;
use crate::ops::traits::{Element, FloatElement, RealElement};

pub(crate) fn cumsum_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = scan_lanes(&data, geometry, |lane| {
            let mut acc = T::ZERO;
            lane.iter()
                .map(|&x| {
                    acc = acc.acc_add(x);
                    acc
                })
                .collect()
        });
        plan.write_output(0, out)
    })
}

pub(crate) fn cumprod_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = scan_lanes(&data, geometry, |lane| {
            let mut acc = T::ONE;
            lane.iter()
                .map(|&x| {
                    acc = acc.acc_mul(x);
                    acc
                })
                .collect()
        });
        plan.write_output(0, out)
    })
}

/// `log(exp(x) + exp(y))` without overflow. Two equal infinities return `x`.
pub(crate) fn log_add_exp<T: FloatElement>(x: T, y: T) -> T {
    let (min, max) = if y.is_nan() {
        (y, y)
    } else {
        (if y < x { y } else { x }, if x < y { y } else { x })
    };
    if min != max || min.is_finite() {
        max + (min - max).exp().ln_1p()
    } else {
        x
    }
}

pub(crate) fn logcumsumexp_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_float!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = scan_lanes(&data, geometry, |lane| {
            let mut acc = T::neg_infinity();
            lane.iter()
                .map(|&x| {
                    acc = log_add_exp(x, acc);
                    acc
                })
                .collect()
        });
        plan.write_output(0, out)
    }, "logcumsumexp")
}

/// Running extreme and the index where it was last taken.
///
/// The running value moves to `x` when `x` is NaN, or when neither is NaN and
/// `advance(x, running)` holds. With `>=`/`<=` ties move to the later index.
pub(crate) fn running_extreme<T: RealElement>(lane: &[T], advance: fn(T, T) -> bool) -> Vec<(T, i64)> {
    let mut running = lane[0];
    let mut index = 0i64;
    lane.iter()
        .enumerate()
        .map(|(k, &x)| {
            if x.is_nan_value() || (!running.is_nan_value() && advance(x, running)) {
                running = x;
                index = k as i64;
            }
            (running, index)
        })
        .collect()
}

fn at_least<T: RealElement>(x: T, running: T) -> bool {
    x >= running
}

fn at_most<T: RealElement>(x: T, running: T) -> bool {
    x <= running
}

fn write_values_and_indices<T: Element>(plan: &IterationPlan, pairs: Vec<(T, i64)>) -> Result<(), ReductaError> {
    let (values, indices): (Vec<T>, Vec<i64>) = pairs.into_iter().unzip();
    plan.write_output(0, values)?;
    plan.write_output(1, indices)
}

pub(crate) fn cummax_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let pairs = scan_lanes(&data, geometry, |lane| running_extreme(lane, at_least::<T>));
        write_values_and_indices(plan, pairs)
    }, "cummax")
}

pub(crate) fn cummin_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let pairs = scan_lanes(&data, geometry, |lane| running_extreme(lane, at_most::<T>));
        write_values_and_indices(plan, pairs)
    }, "cummin")
}
