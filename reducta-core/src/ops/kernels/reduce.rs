//! Reduction kernels: one value (or one pair) per lane.

use crate::error::ReductaError;
use crate::ops::kernels::map_lanes;
use crate::ops::reduction::dispatch::KernelArgs;
use crate::ops::reduction::plan::IterationPlan;
use crate::ops::traits::{Element, FloatLike, RealElement};

const PAIRWISE_BLOCK: usize = 128;

/// Pairwise summation; keeps float rounding error logarithmic in the lane length.
pub(crate) fn pairwise_sum<T: Element>(values: &[T]) -> T {
    if values.len() <= PAIRWISE_BLOCK {
        return values.iter().fold(T::ZERO, |acc, &x| acc.acc_add(x));
    }
    let mid = values.len() / 2;
    pairwise_sum(&values[..mid]).acc_add(pairwise_sum(&values[mid..]))
}

pub(crate) fn sum_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| pairwise_sum(lane));
        plan.write_output(0, out)
    })
}

pub(crate) fn nansum_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| {
            lane.iter()
                .filter(|x| !x.is_nan_value())
                .fold(T::ZERO, |acc, &x| acc.acc_add(x))
        });
        plan.write_output(0, out)
    })
}

pub(crate) fn prod_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| {
            lane.iter().fold(T::ONE, |acc, &x| acc.acc_mul(x))
        });
        plan.write_output(0, out)
    })
}

pub(crate) fn and_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane.iter().all(|x| x.is_truthy()));
        plan.write_output(0, out)
    })
}

pub(crate) fn or_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_dtype!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane.iter().any(|x| x.is_truthy()));
        plan.write_output(0, out)
    })
}

/// Extreme value of a non-empty lane. The first NaN wins and stays.
fn lane_extreme<T: RealElement>(lane: &[T], prefer: fn(T, T) -> bool) -> (T, usize) {
    let mut best = lane[0];
    let mut best_index = 0;
    for (k, &x) in lane.iter().enumerate().skip(1) {
        if best.is_nan_value() {
            break;
        }
        if x.is_nan_value() || prefer(x, best) {
            best = x;
            best_index = k;
        }
    }
    (best, best_index)
}

fn greater<T: RealElement>(a: T, b: T) -> bool {
    a > b
}

fn less<T: RealElement>(a: T, b: T) -> bool {
    a < b
}

pub(crate) fn max_values_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane_extreme(lane, greater::<T>).0);
        plan.write_output(0, out)
    }, "amax")
}

pub(crate) fn min_values_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane_extreme(lane, less::<T>).0);
        plan.write_output(0, out)
    }, "amin")
}

/// Writes the minimum to output 0 and the maximum to output 1.
pub(crate) fn aminmax_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let pairs = map_lanes(&data, geometry, |lane| {
            (lane_extreme(lane, less::<T>).0, lane_extreme(lane, greater::<T>).0)
        });
        let (mins, maxs): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();
        plan.write_output(0, mins)?;
        plan.write_output(1, maxs)
    }, "aminmax")
}

/// Index of the first maximum; ties keep the earliest index.
pub(crate) fn argmax_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane_extreme(lane, greater::<T>).1 as i64);
        plan.write_output(0, out)
    }, "argmax")
}

pub(crate) fn argmin_kernel(plan: &mut IterationPlan, _args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    dispatch_real!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane_extreme(lane, less::<T>).1 as i64);
        plan.write_output(0, out)
    }, "argmin")
}

fn nan_aware_max(acc: f64, a: f64) -> f64 {
    if acc.is_nan() || a.is_nan() || a > acc {
        if acc.is_nan() {
            acc
        } else {
            a
        }
    } else {
        acc
    }
}

fn nan_aware_min(acc: f64, a: f64) -> f64 {
    if acc.is_nan() || a.is_nan() || a < acc {
        if acc.is_nan() {
            acc
        } else {
            a
        }
    } else {
        acc
    }
}

/// p-norm of a lane, accumulated in `f64`.
pub(crate) fn lane_norm<T: FloatLike>(lane: &[T], p: f64) -> f64 {
    let abs = lane.iter().map(|x| x.abs_f64());
    if p == 0.0 {
        abs.filter(|&a| a != 0.0).count() as f64
    } else if p == f64::INFINITY {
        abs.fold(0.0, nan_aware_max)
    } else if p == f64::NEG_INFINITY {
        abs.fold(f64::INFINITY, nan_aware_min)
    } else if p == 1.0 {
        abs.sum()
    } else if p == 2.0 {
        abs.map(|a| a * a).sum::<f64>().sqrt()
    } else {
        abs.map(|a| a.powf(p)).sum::<f64>().powf(1.0 / p)
    }
}

pub(crate) fn norm_kernel(plan: &mut IterationPlan, args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    let p = args.p;
    dispatch_float_like!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let out = map_lanes(&data, geometry, |lane| lane_norm(lane, p));
        plan.write_output(0, out)
    }, "norm")
}

/// Two-pass `(variance, mean)` of a lane with divisor `max(0, n - correction)`.
pub(crate) fn lane_variance<T: Element>(lane: &[T], correction: i64) -> (f64, f64) {
    let n = lane.len();
    let mean = lane.iter().map(|x| x.as_f64()).sum::<f64>() / n as f64;
    let m2: f64 = lane
        .iter()
        .map(|x| {
            let d = x.as_f64() - mean;
            d * d
        })
        .sum();
    let divisor = (n as i64 - correction).max(0) as f64;
    (m2 / divisor, mean)
}

/// Writes the variance (or standard deviation) to output 0 and, when the plan
/// has a second output, the mean to output 1.
pub(crate) fn std_var_kernel(plan: &mut IterationPlan, args: &KernelArgs) -> Result<(), ReductaError> {
    let geometry = plan.geometry;
    let KernelArgs {
        correction,
        take_sqrt,
        ..
    } = *args;
    dispatch_float!(plan.compute_dtype, T => {
        let data = plan.input_as::<T>()?;
        let pairs = map_lanes(&data, geometry, |lane| {
            let (var, mean) = lane_variance(lane, correction);
            (if take_sqrt { var.sqrt() } else { var }, mean)
        });
        let (spread, means): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        plan.write_output(0, spread)?;
        if plan.outputs.len() > 1 {
            plan.write_output(1, means)?;
        }
        Ok(())
    }, "std_var")
}
