use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Converts a tensor to `new_dtype`, returning a new contiguous tensor with
/// the same shape and names.
///
/// A tensor that already has `new_dtype` is returned as a shared handle.
///
/// # Errors
/// `DeviceMismatch` for non-CPU tensors.
pub fn cast_op(tensor: &Tensor, new_dtype: DType) -> Result<Tensor, ReductaError> {
    if tensor.device() != StorageDevice::CPU {
        return Err(ReductaError::DeviceMismatch {
            operation: "cast_op".to_string(),
            expected: StorageDevice::CPU,
            actual: tensor.device(),
        });
    }
    if tensor.dtype() == new_dtype {
        return Ok(tensor.clone());
    }
    let (shape, names) = (tensor.shape(), tensor.names());
    let converted = dispatch_dtype!(new_dtype, T => {
        Tensor::from_vec(tensor.to_vec_as::<T>()?, shape)?
    });
    converted.set_names(names);
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn test_cast_float_to_int_truncates() {
        let t = Tensor::new(vec![1.7, -2.2, 3.0], vec![3]).unwrap();
        let cast = cast_op(&t, DType::I32).unwrap();
        assert_eq!(cast.dtype(), DType::I32);
        assert_eq!(cast.to_vec::<i32>().unwrap(), vec![1, -2, 3]);
    }

    #[test]
    fn test_cast_bool_and_complex() {
        let t = Tensor::new_bool(vec![true, false], vec![2]).unwrap();
        assert_eq!(cast_op(&t, DType::F64).unwrap().to_vec::<f64>().unwrap(), vec![1.0, 0.0]);
        let z = cast_op(&t, DType::Complex128).unwrap();
        assert_eq!(z.to_vec::<Complex<f64>>().unwrap()[0], Complex::new(1.0, 0.0));
    }

    #[test]
    fn test_same_dtype_shares_data() {
        let t = Tensor::new(vec![1.0], vec![1]).unwrap();
        let same = cast_op(&t, DType::F32).unwrap();
        assert!(std::sync::Arc::ptr_eq(&t.data, &same.data));
    }
}
