//! Output dtype and output shape of a reduction.

use crate::error::ReductaError;
use crate::ops::reduction::axes::AxisSet;
use crate::types::DType;

/// Compute/output dtype of a reduction.
///
/// Precedence: `explicit`, then the dtype of an existing output buffer, then
/// the input dtype, with integral inputs (bool included) promoted to `I64`
/// when `promote_integers` is set.
pub fn resolve_dtype(
    self_dtype: DType,
    explicit: Option<DType>,
    out_dtype: Option<DType>,
    promote_integers: bool,
) -> DType {
    if let Some(dtype) = explicit {
        return dtype;
    }
    if let Some(dtype) = out_dtype {
        return dtype;
    }
    if promote_integers && self_dtype.is_integral(true) {
        DType::I64
    } else {
        self_dtype
    }
}

/// Like [`resolve_dtype`] for norms and variances: without an explicit or
/// existing dtype, complex inputs resolve to their real counterpart.
pub fn resolve_real_value_dtype(
    self_dtype: DType,
    explicit: Option<DType>,
    out_dtype: Option<DType>,
) -> DType {
    explicit
        .or(out_dtype)
        .unwrap_or_else(|| self_dtype.to_real_value_type())
}

/// Result dtype of `all`/`any`: `U8` stays `U8`, everything else gives `Bool`.
///
/// # Errors
/// `TypeMismatch` if an existing output is neither `Bool` nor `U8`.
pub fn resolve_bool_or_byte_dtype(
    self_dtype: DType,
    out_dtype: Option<DType>,
    operation: &str,
) -> Result<DType, ReductaError> {
    match out_dtype {
        Some(dtype @ (DType::Bool | DType::U8)) => Ok(dtype),
        Some(other) => Err(ReductaError::TypeMismatch {
            expected: DType::Bool,
            actual: other,
            operation: format!("{}: out dtype must be Bool or U8", operation),
        }),
        None if self_dtype == DType::U8 => Ok(DType::U8),
        None => Ok(DType::Bool),
    }
}

/// Output shape for reducing `axes` of `shape`.
///
/// Reduced axes become 1 with `keepdim`, otherwise they disappear. Kept axes
/// keep their size and order.
pub fn get_reduction_shape(shape: &[usize], axes: &AxisSet, keepdim: bool) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter_map(|(i, &size)| {
            if !axes.contains(i) {
                Some(size)
            } else if keepdim {
                Some(1)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dtype_precedence() {
        assert_eq!(resolve_dtype(DType::I32, Some(DType::F64), Some(DType::F32), true), DType::F64);
        assert_eq!(resolve_dtype(DType::I32, None, Some(DType::F32), true), DType::F32);
        assert_eq!(resolve_dtype(DType::I32, None, None, true), DType::I64);
        assert_eq!(resolve_dtype(DType::Bool, None, None, true), DType::I64);
        assert_eq!(resolve_dtype(DType::I32, None, None, false), DType::I32);
        assert_eq!(resolve_dtype(DType::F32, None, None, true), DType::F32);
    }

    #[test]
    fn test_resolve_real_value_dtype() {
        assert_eq!(resolve_real_value_dtype(DType::Complex64, None, None), DType::F32);
        assert_eq!(resolve_real_value_dtype(DType::Complex128, None, None), DType::F64);
        assert_eq!(
            resolve_real_value_dtype(DType::Complex64, Some(DType::Complex64), None),
            DType::Complex64
        );
        assert_eq!(resolve_real_value_dtype(DType::F32, None, Some(DType::F64)), DType::F64);
    }

    #[test]
    fn test_resolve_bool_or_byte_dtype() {
        assert_eq!(resolve_bool_or_byte_dtype(DType::U8, None, "all").unwrap(), DType::U8);
        assert_eq!(resolve_bool_or_byte_dtype(DType::F32, None, "all").unwrap(), DType::Bool);
        assert_eq!(resolve_bool_or_byte_dtype(DType::I64, None, "any").unwrap(), DType::Bool);
        assert_eq!(
            resolve_bool_or_byte_dtype(DType::F32, Some(DType::U8), "any").unwrap(),
            DType::U8
        );
        assert!(resolve_bool_or_byte_dtype(DType::F32, Some(DType::F32), "any").is_err());
    }

    #[test]
    fn test_get_reduction_shape() {
        let axes = AxisSet::from_axes(&[0, 2]);
        assert_eq!(get_reduction_shape(&[2, 3, 4], &axes, false), vec![3]);
        assert_eq!(get_reduction_shape(&[2, 3, 4], &axes, true), vec![1, 3, 1]);
        assert_eq!(get_reduction_shape(&[], &AxisSet::full(0), false), Vec::<usize>::new());
    }
}
