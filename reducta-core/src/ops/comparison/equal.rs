use crate::error::ReductaError;
use crate::named::are_names_equal;
use crate::ops::traits::Element;
use crate::tensor::Tensor;

/// Returns `true` if `a` and `b` have the same names, shape and elements.
///
/// Checks run in order: names (differ → `false`), device, dtype, shape
/// (differ → `false`), then elements with an early exit on the first
/// difference. NaN never equals NaN.
///
/// # Errors
/// - `DeviceMismatch` if the tensors live on different devices.
/// - `TypeMismatch` if their dtypes differ.
///
/// # Example
/// ```
/// use reducta_core::tensor::Tensor;
/// use reducta_core::ops::comparison::equal_op;
///
/// let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
/// let b = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
/// assert!(equal_op(&a, &b).unwrap());
/// ```
pub fn equal_op(a: &Tensor, b: &Tensor) -> Result<bool, ReductaError> {
    if !are_names_equal(a, b) {
        return Ok(false);
    }
    if a.device() != b.device() {
        return Err(ReductaError::DeviceMismatch {
            expected: a.device(),
            actual: b.device(),
            operation: "equal".to_string(),
        });
    }
    if a.dtype() != b.dtype() {
        return Err(ReductaError::TypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
            operation: "equal".to_string(),
        });
    }
    if a.shape() != b.shape() {
        return Ok(false);
    }

    let a_guard = a.read_data();
    let b_guard = b.read_data();
    dispatch_dtype!(a_guard.dtype, T => {
        let a_slice = a_guard.buffer().try_get_cpu_slice::<T>()?;
        let b_slice = b_guard.buffer().try_get_cpu_slice::<T>()?;
        Ok(elements_equal::<T>(
            a_slice,
            &a_guard.logical_offsets(),
            b_slice,
            &b_guard.logical_offsets(),
        ))
    })
}

fn elements_equal<T: Element>(a: &[T], a_offsets: &[usize], b: &[T], b_offsets: &[usize]) -> bool {
    a_offsets
        .iter()
        .zip(b_offsets)
        .all(|(&i, &j)| a[i] == b[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StorageDevice;
    use crate::error::ErrorKind;
    use crate::tensor;
    use crate::types::DType;

    #[test]
    fn test_equal_values() {
        let a = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let b = Tensor::new_i64(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let c = Tensor::new_i64(vec![1, 2, 3, 5], vec![2, 2]).unwrap();
        assert!(equal_op(&a, &b).unwrap());
        assert!(!equal_op(&a, &c).unwrap());
    }

    #[test]
    fn test_shape_difference_is_false() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let b = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        assert!(!equal_op(&a, &b).unwrap());
        let empty = Tensor::new(vec![], vec![0]).unwrap();
        assert!(equal_op(&empty, &Tensor::new(vec![], vec![0]).unwrap()).unwrap());
    }

    #[test]
    fn test_dtype_difference_is_an_error() {
        let a = Tensor::new(vec![1.0], vec![1]).unwrap();
        let b = Tensor::new_f64(vec![1.0], vec![1]).unwrap();
        assert_eq!(equal_op(&a, &b).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_names_checked_first() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap().with_names(&[Some("x")]).unwrap();
        let b = Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap();
        // Names differ, so the dtype mismatch is never reached.
        assert!(!equal_op(&a, &b).unwrap());
    }

    #[test]
    fn test_device_mismatch() {
        let a = tensor::empty(&[2], DType::F32, StorageDevice::GPU).unwrap();
        let b = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(equal_op(&a, &b), Err(ReductaError::DeviceMismatch { .. })));
    }

    #[test]
    fn test_nan_and_views() {
        let a = Tensor::new_f64(vec![f64::NAN], vec![1]).unwrap();
        assert!(!equal_op(&a, &a.clone()).unwrap());

        let m = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let t = m.transpose(0, 1).unwrap();
        let expected = Tensor::new(vec![1.0, 3.0, 2.0, 4.0], vec![2, 2]).unwrap();
        assert!(equal_op(&t, &expected).unwrap());
    }
}
