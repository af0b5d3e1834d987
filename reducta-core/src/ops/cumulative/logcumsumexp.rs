use crate::error::ReductaError;
use crate::named::dimname_to_position;
use crate::ops::cumulative::{run_scan, single_output};
use crate::ops::reduction::dispatch::OpKind;
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::tensor::Tensor;

/// Running `log(sum(exp(x)))` along `dim`, computed without overflow.
///
/// The result has the input dtype. Only real floating inputs are supported.
///
/// # Errors
/// `UnsupportedDType` for integral, bool or complex input, checked before any
/// caller buffer is touched.
pub fn logcumsumexp_op(input: &Tensor, dim: isize) -> Result<Tensor, ReductaError> {
    logcumsumexp_impl(input, dim, OutputBuffer::NoOutput)
}

/// # Errors
/// `TypeMismatch` if `out` does not have the input dtype.
pub fn logcumsumexp_out(input: &Tensor, dim: isize, out: &Tensor) -> Result<Tensor, ReductaError> {
    logcumsumexp_impl(input, dim, OutputBuffer::Existing(out))
}

pub fn logcumsumexp_named(input: &Tensor, name: &str) -> Result<Tensor, ReductaError> {
    logcumsumexp_op(input, dimname_to_position(input, name)?)
}

fn logcumsumexp_impl(input: &Tensor, dim: isize, out: OutputBuffer<'_>) -> Result<Tensor, ReductaError> {
    let dtype = input.dtype();
    if !dtype.is_floating_point() {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: "logcumsumexp".to_string(),
            message: "logcumsumexp is only implemented for real floating types".to_string(),
        });
    }
    let outputs = run_scan(OpKind::LogCumSumExp, input, dim, dtype, None, &[OutputSpec::new(out, dtype)])?;
    single_output(OpKind::LogCumSumExp, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::utils::testing::check_tensor_near;

    #[test]
    fn test_logcumsumexp_values() {
        let t = Tensor::new_f64(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0], vec![2, 3]).unwrap();
        let r = logcumsumexp_op(&t, 1).unwrap();
        let row2 = |k: usize| ((1..=k + 1).map(|v| (v as f64).exp()).sum::<f64>()).ln();
        check_tensor_near(
            &r,
            &[2, 3],
            &[0.0, 2f64.ln(), 3f64.ln(), row2(0), row2(1), row2(2)],
            1e-12,
        );
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let t = Tensor::new(vec![1000.0, 1000.0], vec![2]).unwrap();
        let r = logcumsumexp_op(&t, 0).unwrap();
        check_tensor_near(&r, &[2], &[1000.0, 1000.0 + 2f64.ln()], 1e-3);

        let inf = Tensor::new_f64(vec![f64::NEG_INFINITY, f64::NEG_INFINITY, 1.0], vec![3]).unwrap();
        check_tensor_near(&logcumsumexp_op(&inf, 0).unwrap(), &[3], &[f64::NEG_INFINITY, f64::NEG_INFINITY, 1.0], 1e-12);
    }

    #[test]
    fn test_out_dtype_must_match_input() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let out = Tensor::new_f64(vec![], vec![0]).unwrap();
        assert_eq!(logcumsumexp_out(&t, 0, &out).unwrap_err().kind(), ErrorKind::TypeMismatch);

        let good = Tensor::new(vec![], vec![0]).unwrap();
        logcumsumexp_out(&t, -1, &good).unwrap();
        assert_eq!(good.shape(), vec![2]);
    }

    #[test]
    fn test_integer_input_is_rejected() {
        let t = Tensor::new_i64(vec![1, 2], vec![2]).unwrap();
        assert!(matches!(logcumsumexp_op(&t, 0), Err(ReductaError::UnsupportedDType { .. })));

        let empty = Tensor::new_i64(vec![], vec![0]).unwrap();
        assert!(matches!(logcumsumexp_op(&empty, 0), Err(ReductaError::UnsupportedDType { .. })));
    }

    #[test]
    fn test_rejected_input_leaves_out_untouched() {
        let t = Tensor::new_i64(vec![1, 2, 3], vec![3]).unwrap();
        let out = Tensor::new_i64(vec![], vec![0]).unwrap();
        assert!(matches!(
            logcumsumexp_out(&t, 0, &out),
            Err(ReductaError::UnsupportedDType { .. })
        ));
        assert_eq!(out.shape(), vec![0]);
    }
}
