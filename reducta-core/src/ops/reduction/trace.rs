use num_complex::Complex;

use crate::error::ReductaError;
use crate::ops::traits::Element;
use crate::tensor::Tensor;

/// Sum of the main diagonal of a matrix.
///
/// Integral and bool inputs give an `I64` scalar; other dtypes keep the input
/// dtype. The diagonal is accumulated in `i64` or `Complex<f64>`.
///
/// # Errors
/// `InvalidRank` unless the input has exactly two dimensions.
pub fn trace_op(input: &Tensor) -> Result<Tensor, ReductaError> {
    let shape = input.shape();
    if shape.len() != 2 {
        return Err(ReductaError::InvalidRank {
            expected: "2 (a matrix)".to_string(),
            actual: shape.len(),
            operation: "trace".to_string(),
        });
    }
    let (rows, cols) = (shape[0], shape[1]);
    let diagonal = rows.min(cols);

    dispatch_dtype!(input.dtype(), T => {
        let values = input.to_vec::<T>()?;
        let diag = (0..diagonal).map(|i| values[i * cols + i]);
        if T::IS_INTEGRAL {
            let total = diag.fold(0i64, |acc, v| acc.wrapping_add(v.as_i64()));
            Ok(Tensor::scalar(total))
        } else {
            let total = diag.fold(Complex::new(0.0, 0.0), |acc, v| acc + v.as_c128());
            Ok(Tensor::scalar(T::of_c128(total)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DType;

    #[test]
    fn test_trace_square_and_rectangular() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], vec![3, 3]).unwrap();
        assert_eq!(trace_op(&t).unwrap().item::<f32>().unwrap(), 15.0);

        let wide = Tensor::new_f64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        assert_eq!(trace_op(&wide).unwrap().item::<f64>().unwrap(), 6.0);

        // Transposed view: diagonal read through strides.
        let tall = wide.transpose(0, 1).unwrap();
        assert_eq!(trace_op(&tall).unwrap().item::<f64>().unwrap(), 6.0);
    }

    #[test]
    fn test_trace_integers_widen() {
        let t = Tensor::new_i32(vec![i32::MAX, 0, 0, i32::MAX], vec![2, 2]).unwrap();
        let tr = trace_op(&t).unwrap();
        assert_eq!(tr.dtype(), DType::I64);
        assert_eq!(tr.item::<i64>().unwrap(), 2 * i32::MAX as i64);

        let b = Tensor::new_bool(vec![true, false, false, true], vec![2, 2]).unwrap();
        assert_eq!(trace_op(&b).unwrap().item::<i64>().unwrap(), 2);
    }

    #[test]
    fn test_trace_empty_and_complex() {
        let empty = Tensor::new(vec![], vec![0, 3]).unwrap();
        assert_eq!(trace_op(&empty).unwrap().item::<f32>().unwrap(), 0.0);

        let z = Tensor::new_complex64(
            vec![Complex::new(1.0, 1.0), Complex::new(9.0, 9.0), Complex::new(9.0, 9.0), Complex::new(2.0, -3.0)],
            vec![2, 2],
        )
        .unwrap();
        assert_eq!(trace_op(&z).unwrap().item::<Complex<f32>>().unwrap(), Complex::new(3.0, -2.0));
    }

    #[test]
    fn test_trace_requires_matrix() {
        let v = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        assert!(matches!(trace_op(&v), Err(ReductaError::InvalidRank { .. })));
    }
}
