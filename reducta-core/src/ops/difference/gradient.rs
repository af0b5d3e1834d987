//! Numerical derivative of sampled values (`numpy.gradient` semantics).
//!
//! Interior points use the second-order central stencil, which for
//! non-uniform coordinates weighs the three neighbours by the two adjacent
//! steps. Boundary points use a one-sided stencil of order `edge_order`.

use crate::config::default_float_dtype;
use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::difference::{from_lanes, lanes_of};
use crate::ops::dtype::cast_op;
use crate::ops::reduction::axes::wrap_dim;
use crate::ops::traits::FloatLike;
use crate::tensor::Tensor;
use crate::types::DType;

/// Distance between samples.
#[derive(Debug, Clone, Copy)]
pub enum Spacing<'a> {
    /// A step of 1 along every axis.
    Unit,
    /// The same step along every axis.
    Scalar(f64),
    /// One step per differentiated axis; a single value applies to all of them.
    Scalars(&'a [f64]),
    /// Sample coordinates per differentiated axis, each a rank-1 tensor as long as the axis.
    Coordinates(&'a [Tensor]),
}

#[derive(Debug, Clone)]
enum AxisSteps {
    Uniform(f64),
    /// `steps[i] = x[i + 1] - x[i]`.
    Varying(Vec<f64>),
}

/// Estimates the derivative of `input` along each axis in `dims` (every axis
/// when `None`), returning one tensor per axis with the input's shape.
///
/// Bool and integer inputs are differentiated in the default float dtype.
///
/// # Errors
/// - `UnsupportedDType` for `U8` input.
/// - `InvalidArgument` for an `edge_order` other than 1 or 2, a repeated
///   axis, or a spacing list whose length does not match the axes.
/// - `EmptyReduction` if a differentiated axis has fewer than `edge_order + 1` samples.
/// - `InvalidRank` for a rank-0 input.
/// - `InvalidRank`, `ShapeMismatch` or `DeviceMismatch` for unusable coordinates.
pub fn gradient_op(
    input: &Tensor,
    spacing: Spacing<'_>,
    dims: Option<&[isize]>,
    edge_order: usize,
) -> Result<Vec<Tensor>, ReductaError> {
    let dtype = input.dtype();
    if dtype == DType::U8 {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: "gradient".to_string(),
            message: "gradient does not support uint8 input".to_string(),
        });
    }
    let shape = input.shape();
    let rank = shape.len();
    if rank == 0 {
        return Err(ReductaError::InvalidRank {
            expected: "at least 1".to_string(),
            actual: 0,
            operation: "gradient".to_string(),
        });
    }
    let axes: Vec<usize> = match dims {
        Some(dims) => {
            let mut seen = Vec::with_capacity(dims.len());
            for &dim in dims {
                let d = wrap_dim(dim, rank)?;
                if seen.contains(&d) {
                    return Err(ReductaError::InvalidArgument {
                        operation: "gradient".to_string(),
                        message: format!("dim {} appears multiple times in the list of dims", d),
                    });
                }
                seen.push(d);
            }
            seen
        }
        None => (0..rank).collect(),
    };
    check_spacing_len(spacing, dims.is_some(), axes.len(), rank)?;
    if edge_order != 1 && edge_order != 2 {
        return Err(ReductaError::InvalidArgument {
            operation: "gradient".to_string(),
            message: format!("only edge_order=1 and edge_order=2 are supported, got {}", edge_order),
        });
    }
    if let Some(&d) = axes.iter().find(|&&d| shape[d] < edge_order + 1) {
        return Err(ReductaError::EmptyReduction {
            operation: "gradient".to_string(),
            message: format!(
                "expected each dimension size to be at least edge_order+1 = {}, but dim {} has size {}",
                edge_order + 1,
                d,
                shape[d]
            ),
        });
    }

    let steps = axes
        .iter()
        .enumerate()
        .map(|(i, &d)| axis_steps(input, spacing, i, shape[d]))
        .collect::<Result<Vec<_>, _>>()?;

    let work_dtype = if dtype.is_integral(true) { default_float_dtype() } else { dtype };
    let work = cast_op(input, work_dtype)?;
    dispatch_float_like!(work_dtype, T => {
        axes.iter()
            .zip(&steps)
            .map(|(&d, step)| -> Result<Tensor, ReductaError> {
                let per_lane: Vec<Vec<T>> = lanes_of::<T>(&work, d)?
                    .into_iter()
                    .map(|f| lane_gradient(&f, step, edge_order))
                    .collect();
                let result = from_lanes(per_lane, shape.clone(), d)?;
                result.set_names(input.names());
                Ok(result)
            })
            .collect()
    }, "gradient")
}

fn check_spacing_len(
    spacing: Spacing<'_>,
    dims_given: bool,
    axis_count: usize,
    rank: usize,
) -> Result<(), ReductaError> {
    let len = match spacing {
        Spacing::Unit | Spacing::Scalar(_) => return Ok(()),
        Spacing::Scalars(values) => values.len(),
        Spacing::Coordinates(coords) => coords.len(),
    };
    let scalar_broadcast = matches!(spacing, Spacing::Scalars(_)) && len == 1;
    let ok = if dims_given {
        len == axis_count
    } else {
        len == rank || scalar_broadcast
    };
    if ok {
        return Ok(());
    }
    let message = if dims_given {
        format!(
            "expected spacing to be unspecified, a scalar or it's spacing and dim arguments to have the same length, but got a spacing argument of length {} and a dim argument of length {}",
            len, axis_count
        )
    } else {
        format!(
            "expected spacing to be unspecified, a scalar or a list of length {} but got a list of length {}",
            rank, len
        )
    };
    Err(ReductaError::InvalidArgument {
        operation: "gradient".to_string(),
        message,
    })
}

/// Steps along the `i`-th differentiated axis, which has `len` samples.
fn axis_steps(input: &Tensor, spacing: Spacing<'_>, i: usize, len: usize) -> Result<AxisSteps, ReductaError> {
    match spacing {
        Spacing::Unit => Ok(AxisSteps::Uniform(1.0)),
        Spacing::Scalar(h) => Ok(AxisSteps::Uniform(h)),
        Spacing::Scalars(values) => Ok(AxisSteps::Uniform(if values.len() == 1 { values[0] } else { values[i] })),
        Spacing::Coordinates(coords) => {
            let coord = &coords[i];
            if coord.device() != input.device() || coord.device() != StorageDevice::CPU {
                return Err(ReductaError::DeviceMismatch {
                    expected: input.device(),
                    actual: coord.device(),
                    operation: "gradient".to_string(),
                });
            }
            if coord.rank() != 1 {
                return Err(ReductaError::InvalidRank {
                    expected: "1 for each element of spacing".to_string(),
                    actual: coord.rank(),
                    operation: "gradient".to_string(),
                });
            }
            if coord.numel() != len {
                return Err(ReductaError::ShapeMismatch {
                    expected: vec![len],
                    actual: coord.shape(),
                    operation: "gradient (coordinates)".to_string(),
                });
            }
            let x = coord.to_vec_as::<f64>()?;
            Ok(AxisSteps::Varying(x.windows(2).map(|w| w[1] - w[0]).collect()))
        }
    }
}

/// Derivative estimate for one lane of at least `edge_order + 1` samples.
fn lane_gradient<T: FloatLike>(f: &[T], steps: &AxisSteps, edge_order: usize) -> Vec<T> {
    let n = f.len();
    let c = |v: f64| T::of_f64(v);
    let mut out = Vec::with_capacity(n);
    match steps {
        AxisSteps::Uniform(h) => {
            let h = c(*h);
            out.push(if edge_order == 1 {
                (f[1] - f[0]) / h
            } else {
                (c(-1.5) * f[0] + c(2.0) * f[1] - c(0.5) * f[2]) / h
            });
            for i in 1..n - 1 {
                out.push((f[i + 1] - f[i - 1]) / h / c(2.0));
            }
            out.push(if edge_order == 1 {
                (f[n - 1] - f[n - 2]) / h
            } else {
                (c(0.5) * f[n - 3] - c(2.0) * f[n - 2] + c(1.5) * f[n - 1]) / h
            });
        }
        AxisSteps::Varying(dx) => {
            out.push(if edge_order == 1 {
                (f[1] - f[0]) / c(dx[0])
            } else {
                let (d0, d1) = (dx[0], dx[1]);
                let a = -(2.0 * d0 + d1) / (d0 * (d0 + d1));
                let b = (d0 + d1) / (d0 * d1);
                let cc = -d0 / (d1 * (d0 + d1));
                c(a) * f[0] + c(b) * f[1] + c(cc) * f[2]
            });
            for i in 1..n - 1 {
                let (d1, d2) = (dx[i - 1], dx[i]);
                let a = -d2 / (d1 * (d1 + d2));
                let b = (d2 - d1) / (d1 * d2);
                let cc = d1 / (d2 * (d1 + d2));
                out.push(c(a) * f[i - 1] + c(b) * f[i] + c(cc) * f[i + 1]);
            }
            out.push(if edge_order == 1 {
                (f[n - 1] - f[n - 2]) / c(dx[n - 2])
            } else {
                let (e1, e2) = (dx[n - 2], dx[n - 3]);
                let a = e1 / (e2 * (e1 + e2));
                let b = -(e1 + e2) / (e1 * e2);
                let cc = (2.0 * e1 + e2) / (e1 * (e1 + e2));
                c(a) * f[n - 3] + c(b) * f[n - 2] + c(cc) * f[n - 1]
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "gradient_test.rs"]
mod tests;
