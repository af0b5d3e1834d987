//! Element-wise binary arithmetic with broadcasting.
//!
//! Both operands must share dtype and device. The result is a fresh
//! contiguous tensor of the broadcast shape; names are not propagated.

use crate::error::ReductaError;
use crate::ops::math_elem::map_elements;
use crate::ops::traits::Element;
use crate::tensor::utils::broadcast_shapes;
use crate::tensor::Tensor;
use crate::types::DType;

fn check_operands(a: &Tensor, b: &Tensor, operation: &str) -> Result<(DType, Vec<usize>), ReductaError> {
    if a.device() != b.device() {
        return Err(ReductaError::DeviceMismatch {
            expected: a.device(),
            actual: b.device(),
            operation: operation.to_string(),
        });
    }
    if a.dtype() != b.dtype() {
        return Err(ReductaError::TypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
            operation: operation.to_string(),
        });
    }
    let shape = broadcast_shapes(&a.shape(), &b.shape())?;
    Ok((a.dtype(), shape))
}

/// Elements of `t` broadcast to `shape`, in logical order.
pub(crate) fn broadcast_values<T: Element>(t: &Tensor, shape: &[usize]) -> Result<Vec<T>, ReductaError> {
    if t.shape() == shape {
        t.to_vec::<T>()
    } else {
        t.expand(shape)?.to_vec::<T>()
    }
}

fn zip_map<T, F>(a: &Tensor, b: &Tensor, shape: Vec<usize>, f: F) -> Result<Tensor, ReductaError>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    let lhs = broadcast_values::<T>(a, &shape)?;
    let rhs = broadcast_values::<T>(b, &shape)?;
    let values = lhs.into_iter().zip(rhs).map(|(x, y)| f(x, y)).collect();
    Tensor::from_vec(values, shape)
}

pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ReductaError> {
    let (dtype, shape) = check_operands(a, b, "add")?;
    dispatch_dtype!(dtype, T => {
        zip_map(a, b, shape, |x: T, y: T| x.acc_add(y))
    })
}

pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ReductaError> {
    let (dtype, shape) = check_operands(a, b, "sub")?;
    dispatch_dtype!(dtype, T => {
        zip_map(a, b, shape, |x: T, y: T| x.acc_sub(y))
    })
}

pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ReductaError> {
    let (dtype, shape) = check_operands(a, b, "mul")?;
    dispatch_dtype!(dtype, T => {
        zip_map(a, b, shape, |x: T, y: T| x.acc_mul(y))
    })
}

/// True division. Floating and complex dtypes only.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, ReductaError> {
    let (dtype, shape) = check_operands(a, b, "div")?;
    dispatch_float_like!(dtype, T => {
        zip_map(a, b, shape, |x: T, y: T| x / y)
    }, "div")
}

/// Multiplies every element by `scalar` converted to the tensor dtype. Keeps names.
pub fn mul_scalar_op(t: &Tensor, scalar: f64) -> Result<Tensor, ReductaError> {
    dispatch_dtype!(t.dtype(), T => {
        let factor = T::of_f64(scalar);
        map_elements(t, |x: T| x.acc_mul(factor))
    })
}

/// Divides every element by `scalar`. Floating and complex dtypes only. Keeps names.
pub fn div_scalar_op(t: &Tensor, scalar: f64) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        let divisor = T::of_f64(scalar);
        map_elements(t, |x: T| x / divisor)
    }, "div_scalar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_broadcast_sub() {
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let b = Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap();
        let c = sub_op(&a, &b).unwrap();
        assert_eq!(c.shape(), vec![2, 3]);
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![0.0, 1.0, 2.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_dtype_mismatch() {
        let a = Tensor::new(vec![1.0], vec![1]).unwrap();
        let b = Tensor::new_f64(vec![1.0], vec![1]).unwrap();
        assert_eq!(add_op(&a, &b).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_integer_div_is_unsupported() {
        let a = Tensor::new_i64(vec![4], vec![1]).unwrap();
        assert!(matches!(div_op(&a, &a), Err(ReductaError::UnsupportedDType { .. })));
        assert_eq!(mul_scalar_op(&a, 3.0).unwrap().to_vec::<i64>().unwrap(), vec![12]);
    }

    #[test]
    fn test_div_scalar_keeps_names() {
        let a = Tensor::new(vec![2.0, 4.0], vec![2]).unwrap().with_names(&[Some("x")]).unwrap();
        let out = div_scalar_op(&a, 2.0).unwrap();
        assert_eq!(out.to_vec::<f32>().unwrap(), vec![1.0, 2.0]);
        assert_eq!(out.names(), Some(vec![Some("x".to_string())]));
    }
}
