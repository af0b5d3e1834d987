//! Gradient formulas for `cumprod`, `cummax`/`cummin` and value-selecting
//! reductions such as `max_dim`.

use crate::error::ReductaError;
use crate::ops::kernels::{lane, scatter_lanes};
use crate::ops::reduction::axes::wrap_dim;
use crate::ops::reduction::plan::LaneGeometry;
use crate::ops::traits::{Element, FloatLike};
use crate::tensor::utils::lane_geometry;
use crate::tensor::{self, Tensor};

fn check_same_shape(expected: &Tensor, actual: &Tensor, operation: &str) -> Result<(), ReductaError> {
    if expected.shape() != actual.shape() {
        return Err(ReductaError::ShapeMismatch {
            expected: expected.shape(),
            actual: actual.shape(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn check_same_dtype(expected: &Tensor, actual: &Tensor, operation: &str) -> Result<(), ReductaError> {
    if expected.dtype() != actual.dtype() {
        return Err(ReductaError::TypeMismatch {
            expected: expected.dtype(),
            actual: actual.dtype(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn geometry_along(shape: &[usize], dim: usize) -> LaneGeometry {
    let (outer, len, inner) = lane_geometry(shape, dim);
    LaneGeometry { outer, len, inner }
}

/// Gradient of `cumprod` for one lane, linear in its length.
///
/// Before the first zero the gradient is a reversed cumulative sum of
/// `conj(y) * g` divided by `conj(x)`. At the first zero only the terms up to
/// the next zero survive. Every later position gets 0.
pub(crate) fn cumprod_lane_backward<T: FloatLike>(x: &[T], y: &[T], g: &[T]) -> Vec<T> {
    let n = x.len();
    let mut out = vec![T::ZERO; n];
    let first_zero = x.iter().position(|&v| v == T::ZERO);
    let end = first_zero.unwrap_or(n);

    let mut suffix = T::ZERO;
    for k in (0..end).rev() {
        suffix = suffix + y[k].conj() * g[k];
        out[k] = suffix / x[k].conj();
    }

    if let Some(z) = first_zero {
        let mut running = T::ONE;
        let mut total = g[z];
        for j in z + 1..n {
            if x[j] == T::ZERO {
                break;
            }
            running = running * x[j].conj();
            total = total + g[j] * running;
        }
        let prefix = if z == 0 { T::ONE } else { y[z - 1].conj() };
        out[z] = prefix * total;
    }
    out
}

/// Gradient of `cumprod` for one lane built from explicit omitted products.
///
/// `out[k] = sum_{j >= k} g[j] * prod_{i <= j, i != k} conj(x[i])`. Quadratic,
/// but never divides, so it stays well defined (and differentiable) with zeros.
pub(crate) fn cumprod_lane_backward_quadratic<T: FloatLike>(x: &[T], g: &[T]) -> Vec<T> {
    let n = x.len();
    let mut prefix = T::ONE;
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let mut running = prefix;
        let mut total = g[k] * running;
        for j in k + 1..n {
            running = running * x[j].conj();
            total = total + g[j] * running;
        }
        out.push(total);
        prefix = prefix * x[k].conj();
    }
    out
}

/// Gradient of `output = cumprod(input, dim)` with respect to `input`.
///
/// With `create_graph` and a zero in the input the quadratic formulation is
/// used; otherwise the linear one.
///
/// # Errors
/// `ShapeMismatch`/`TypeMismatch` if `grad`, `input` and `output` disagree,
/// `UnsupportedDType` for non floating inputs.
pub fn cumprod_backward(
    grad: &Tensor,
    input: &Tensor,
    dim: isize,
    output: &Tensor,
    create_graph: bool,
) -> Result<Tensor, ReductaError> {
    check_same_shape(input, grad, "cumprod_backward")?;
    check_same_shape(input, output, "cumprod_backward")?;
    check_same_dtype(input, grad, "cumprod_backward")?;
    check_same_dtype(input, output, "cumprod_backward")?;
    let shape = input.shape();
    let d = wrap_dim(dim, shape.len())?;
    if input.numel() <= 1 || shape.get(d).copied().unwrap_or(1) == 1 {
        return Ok(grad.clone());
    }
    let geometry = geometry_along(&shape, d);

    dispatch_float_like!(input.dtype(), T => {
        let x = input.to_vec::<T>()?;
        let y = output.to_vec::<T>()?;
        let g = grad.to_vec::<T>()?;
        let quadratic = create_graph && x.contains(&T::ZERO);
        if quadratic {
            log::warn!(
                "cumprod_backward: zeros in the input with create_graph set, using the O(n^2) formula on {} lanes of length {}",
                geometry.lanes(),
                geometry.len
            );
        }
        let per_lane: Vec<Vec<T>> = (0..geometry.lanes())
            .map(|l| {
                let xs = lane(&x, &geometry, l);
                let gs = lane(&g, &geometry, l);
                if quadratic {
                    cumprod_lane_backward_quadratic(&xs, &gs)
                } else {
                    let ys = lane(&y, &geometry, l);
                    cumprod_lane_backward(&xs, &ys, &gs)
                }
            })
            .collect();
        Tensor::from_vec(scatter_lanes(per_lane, geometry), shape)
    }, "cumprod_backward")
}

/// Gradient of `cummax`/`cummin`: each incoming gradient is added at the
/// position its running extreme came from.
///
/// # Errors
/// `ShapeMismatch` if `grad` or `indices` differ from the input shape,
/// `IndexOutOfBounds` for an index outside the scanned axis.
pub fn cummaxmin_backward(
    grad: &Tensor,
    input: &Tensor,
    indices: &Tensor,
    dim: isize,
) -> Result<Tensor, ReductaError> {
    check_same_shape(input, grad, "cummaxmin_backward")?;
    check_same_shape(input, indices, "cummaxmin_backward")?;
    if input.numel() == 0 {
        return tensor::zeros_like(input);
    }
    let shape = input.shape();
    let d = wrap_dim(dim, shape.len())?;
    let geometry = geometry_along(&shape, d);
    let idx = indices.to_vec_as::<i64>()?;

    dispatch_dtype!(grad.dtype(), T => {
        let g = grad.to_vec::<T>()?;
        let mut out = vec![T::ZERO; g.len()];
        for l in 0..geometry.lanes() {
            for k in 0..geometry.len {
                let pos = geometry.index(l, k);
                let target = idx[pos];
                if target < 0 || target as usize >= geometry.len {
                    return Err(ReductaError::IndexOutOfBounds {
                        index: vec![target.max(0) as usize],
                        shape: shape.clone(),
                    });
                }
                let dest = geometry.index(l, target as usize);
                out[dest] = out[dest].acc_add(g[pos]);
            }
        }
        Tensor::from_vec(out, shape)
    })
}

/// Gradient of a reduction that picks one element per lane (`max_dim`,
/// `min_dim`): `grad` is scattered into zeros of `sizes` at `indices`.
///
/// Without `keepdim`, `grad` and `indices` get the reduced axis back first.
///
/// # Errors
/// `ShapeMismatch` if `grad`/`indices` do not have the reduced shape,
/// `IndexOutOfBounds` for an index outside the reduced axis.
pub fn value_selecting_reduction_backward(
    grad: &Tensor,
    dim: isize,
    indices: &Tensor,
    sizes: &[usize],
    keepdim: bool,
) -> Result<Tensor, ReductaError> {
    let rank = sizes.len();
    let d = wrap_dim(dim, rank)?;
    if rank == 0 {
        return Ok(grad.detach());
    }
    let (grad, indices) = if keepdim {
        (grad.clone(), indices.clone())
    } else {
        (grad.unsqueeze(d)?, indices.unsqueeze(d)?)
    };
    let mut reduced_shape = sizes.to_vec();
    reduced_shape[d] = 1;
    for t in [&grad, &indices] {
        if t.shape() != reduced_shape {
            return Err(ReductaError::ShapeMismatch {
                expected: reduced_shape.clone(),
                actual: t.shape(),
                operation: "value_selecting_reduction_backward".to_string(),
            });
        }
    }
    let geometry = geometry_along(sizes, d);
    let idx = indices.to_vec_as::<i64>()?;

    let numel: usize = sizes.iter().product();
    dispatch_dtype!(grad.dtype(), T => {
        let g = grad.to_vec::<T>()?;
        let mut out = vec![T::ZERO; numel];
        for (l, (&value, &target)) in g.iter().zip(idx.iter()).enumerate() {
            if target < 0 || target as usize >= geometry.len {
                return Err(ReductaError::IndexOutOfBounds {
                    index: vec![target.max(0) as usize],
                    shape: sizes.to_vec(),
                });
            }
            out[geometry.index(l, target as usize)] = value;
        }
        Tensor::from_vec(out, sizes.to_vec())
    })
}

#[cfg(test)]
#[path = "backward_test.rs"]
mod tests;
