use crate::error::ReductaError;
use crate::ops::difference::{from_lanes, lanes_of};
use crate::ops::reduction::axes::wrap_dim;
use crate::ops::reduction::finish;
use crate::ops::reduction::plan::OutputBuffer;
use crate::ops::traits::Element;
use crate::tensor::Tensor;

/// `n`-th forward difference along `dim`.
///
/// `prepend` and `append` are concatenated to the input along `dim` first;
/// they must have the input's rank, dtype and sizes on every other axis.
/// Bool inputs use exclusive-or. `n == 0` returns a copy of the input (without
/// `prepend`/`append`) and `n` at or beyond the axis length gives an empty
/// axis.
///
/// # Errors
/// - `InvalidRank` for a rank-0 input.
/// - `InvalidArgument`/`ShapeMismatch` for an incompatible `prepend`/`append`.
/// - `TypeMismatch` if `prepend`/`append` have another dtype.
///
/// # Example
/// ```
/// use reducta_core::tensor::Tensor;
/// use reducta_core::ops::difference::diff_op;
///
/// let t = Tensor::new_i64(vec![1, 4, 9, 16], vec![4]).unwrap();
/// let d = diff_op(&t, 1, -1, None, None).unwrap();
/// assert_eq!(d.to_vec::<i64>().unwrap(), vec![3, 5, 7]);
/// ```
pub fn diff_op(
    input: &Tensor,
    n: usize,
    dim: isize,
    prepend: Option<&Tensor>,
    append: Option<&Tensor>,
) -> Result<Tensor, ReductaError> {
    diff_impl(input, n, dim, prepend, append, OutputBuffer::NoOutput)
}

/// # Errors
/// `TypeMismatch` if `out` does not have the input dtype, plus those of [`diff_op`].
pub fn diff_out(
    input: &Tensor,
    n: usize,
    dim: isize,
    prepend: Option<&Tensor>,
    append: Option<&Tensor>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    diff_impl(input, n, dim, prepend, append, OutputBuffer::Existing(out))
}

fn check_compatible(input: &Tensor, other: Option<&Tensor>, dim: usize) -> Result<(), ReductaError> {
    let Some(other) = other else {
        return Ok(());
    };
    let (shape, other_shape) = (input.shape(), other.shape());
    if other_shape.len() != shape.len() {
        return Err(ReductaError::InvalidArgument {
            operation: "diff".to_string(),
            message: "diff expects prepend or append to be the same dimension as input".to_string(),
        });
    }
    if let Some(i) = (0..shape.len()).find(|&i| i != dim && shape[i] != other_shape[i]) {
        log::debug!(
            "diff: input.size({}) = {}, but prepend/append has size {}",
            i,
            shape[i],
            other_shape[i]
        );
        return Err(ReductaError::ShapeMismatch {
            expected: shape,
            actual: other_shape,
            operation: "diff (prepend/append must match input except along the differencing dimension)".to_string(),
        });
    }
    if other.dtype() != input.dtype() {
        return Err(ReductaError::TypeMismatch {
            expected: input.dtype(),
            actual: other.dtype(),
            operation: "diff".to_string(),
        });
    }
    Ok(())
}

/// Applies the forward difference `n` times to one lane.
fn lane_diff<T: Element>(mut values: Vec<T>, n: usize) -> Vec<T> {
    for _ in 0..n {
        values = values.windows(2).map(|w| w[1].acc_sub(w[0])).collect();
    }
    values
}

fn diff_impl(
    input: &Tensor,
    n: usize,
    dim: isize,
    prepend: Option<&Tensor>,
    append: Option<&Tensor>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let rank = input.rank();
    if rank == 0 {
        return Err(ReductaError::InvalidRank {
            expected: "at least 1".to_string(),
            actual: 0,
            operation: "diff".to_string(),
        });
    }
    let d = wrap_dim(dim, rank)?;
    check_compatible(input, prepend, d)?;
    check_compatible(input, append, d)?;
    if let Some(out_dtype) = out.dtype() {
        if out_dtype != input.dtype() {
            return Err(ReductaError::TypeMismatch {
                expected: input.dtype(),
                actual: out_dtype,
                operation: "diff".to_string(),
            });
        }
    }

    let (prepend, append) = if n == 0 { (None, None) } else { (prepend, append) };
    let result = dispatch_dtype!(input.dtype(), T => {
        let mut lanes = lanes_of::<T>(input, d)?;
        if let Some(before) = prepend {
            for (lane, extra) in lanes.iter_mut().zip(lanes_of::<T>(before, d)?) {
                lane.splice(0..0, extra);
            }
        }
        if let Some(after) = append {
            for (lane, extra) in lanes.iter_mut().zip(lanes_of::<T>(after, d)?) {
                lane.extend(extra);
            }
        }
        let mut shape = input.shape();
        let len = shape[d]
            + prepend.map_or(0, |t| t.shape()[d])
            + append.map_or(0, |t| t.shape()[d]);
        let steps = n.min(len);
        shape[d] = len - steps;
        let per_lane: Vec<Vec<T>> = lanes.into_iter().map(|l| lane_diff(l, steps)).collect();
        from_lanes(per_lane, shape, d)?
    });
    result.set_names(input.names());
    finish(out, result)
}
