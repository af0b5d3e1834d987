use std::cmp::max;

use crate::error::ReductaError;

/// Calculates the row-major strides for a given shape.
///
/// shape = [2, 3] -> strides = [3, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Output shape of broadcasting two shapes (NumPy rules, right-aligned).
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, ReductaError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result_shape[max_rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(ReductaError::ShapeMismatch {
                expected: shape_a.to_vec(),
                actual: shape_b.to_vec(),
                operation: "broadcast_shapes".to_string(),
            });
        };
    }
    Ok(result_shape)
}

/// Splits `shape` around `dim` into `(outer, len, inner)`.
///
/// `outer` is the product of the sizes before `dim`, `inner` the product of the
/// sizes after it. A rank-0 shape is a single lane of length 1.
pub fn lane_geometry(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    if shape.is_empty() {
        return (1, 1, 1);
    }
    let outer = shape[..dim].iter().product();
    let inner = shape[dim + 1..].iter().product();
    (outer, shape[dim], inner)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
