use super::*;
use crate::autograd::grad_check::check_grad;
use crate::error::ErrorKind;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};
use num_complex::Complex;

#[test]
fn test_amax_amin_axes() -> Result<(), ReductaError> {
    let t = Tensor::new(vec![1.0, 5.0, 3.0, 4.0, 2.0, 6.0], vec![2, 3])?;
    check_tensor_near(&amax_op(&t, &AxisSpec::Single(1), false)?, &[2], &[5.0, 6.0], 0.0);
    check_tensor_near(&amin_op(&t, &AxisSpec::Single(0), true)?, &[1, 3], &[1.0, 2.0, 3.0], 0.0);
    check_tensor_near(&amax_op(&t, &AxisSpec::All, false)?, &[], &[6.0], 0.0);
    Ok(())
}

#[test]
fn test_amax_nan_propagates() {
    let t = Tensor::new_f64(vec![1.0, f64::NAN, 3.0], vec![3]).unwrap();
    assert!(amax_op(&t, &AxisSpec::All, false).unwrap().item::<f64>().unwrap().is_nan());
    assert!(amin_op(&t, &AxisSpec::All, false).unwrap().item::<f64>().unwrap().is_nan());
}

#[test]
fn test_amax_integers_keep_dtype() {
    let t = Tensor::new_i32(vec![-4, 7, 2], vec![3]).unwrap();
    let m = amax_op(&t, &AxisSpec::All, false).unwrap();
    assert_eq!(m.dtype(), DType::I32);
    assert_eq!(m.item::<i32>().unwrap(), 7);
}

#[test]
fn test_amax_empty_reduced_axis_fails() {
    let t = Tensor::new(vec![], vec![2, 0]).unwrap();
    let err = amax_op(&t, &AxisSpec::Single(1), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
    // Reducing the non-empty axis is fine and yields an empty result.
    let ok = amax_op(&t, &AxisSpec::Single(0), false).unwrap();
    assert_eq!(ok.shape(), vec![0]);
}

#[test]
fn test_amax_out_dtype_must_match() {
    let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let out = Tensor::new_f64(vec![0.0], vec![1]).unwrap();
    let err = amax_out(&t, &AxisSpec::All, false, &out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let good = Tensor::new(vec![0.0; 4], vec![4]).unwrap();
    amin_out(&t, &AxisSpec::All, true, &good).unwrap();
    check_tensor_near(&good, &[1], &[1.0], 0.0);
}

#[test]
fn test_complex_is_rejected() {
    let z = Tensor::new_complex64(vec![Complex::new(1.0, 0.0)], vec![1]).unwrap();
    assert!(matches!(
        amax_op(&z, &AxisSpec::All, false),
        Err(ReductaError::UnsupportedDType { .. })
    ));
}

#[test]
fn test_aminmax() {
    let t = Tensor::new(vec![3.0, -1.0, 4.0, 1.0, 5.0, -9.0], vec![2, 3]).unwrap();
    let (min, max) = aminmax_op(&t, None, false).unwrap();
    assert_eq!(min.item::<f32>().unwrap(), -9.0);
    assert_eq!(max.item::<f32>().unwrap(), 5.0);

    let (min, max) = aminmax_op(&t, Some(1), true).unwrap();
    check_tensor_near(&min, &[2, 1], &[-1.0, -9.0], 0.0);
    check_tensor_near(&max, &[2, 1], &[4.0, 5.0], 0.0);

    let (min, _) = aminmax_op(&t, None, true).unwrap();
    assert_eq!(min.shape(), vec![1, 1]);
}

#[test]
fn test_aminmax_empty_without_dim_fails() {
    let t = Tensor::new(vec![], vec![0]).unwrap();
    let err = aminmax_op(&t, None, false).unwrap_err();
    assert!(matches!(err, ReductaError::EmptyReduction { .. }));
}

#[test]
fn test_aminmax_out() {
    let t = Tensor::new_i64(vec![4, 2, 8], vec![3]).unwrap();
    let min = Tensor::new_i64(vec![], vec![0]).unwrap();
    let max = Tensor::new_i64(vec![], vec![0]).unwrap();
    aminmax_out(&t, Some(0), false, &min, &max).unwrap();
    assert_eq!(min.item::<i64>().unwrap(), 2);
    assert_eq!(max.item::<i64>().unwrap(), 8);
}

#[test]
fn test_max_dim_and_min_dim() {
    let t = create_test_tensor(vec![1.0, 7.0, 7.0, 9.0, 0.0, 2.0], vec![2, 3]);
    let (values, indices) = max_dim(&t, 1, false).unwrap();
    check_tensor_near(&values, &[2], &[7.0, 9.0], 0.0);
    assert_eq!(indices.dtype(), DType::I64);
    assert_eq!(indices.to_vec::<i64>().unwrap(), vec![1, 0]);

    let (values, indices) = min_dim(&t, 0, true).unwrap();
    check_tensor_near(&values, &[1, 3], &[1.0, 0.0, 2.0], 0.0);
    assert_eq!(indices.to_vec::<i64>().unwrap(), vec![0, 1, 1]);
    assert!(values.grad_fn().is_none());
}

#[test]
fn test_max_dim_attaches_backward() {
    let t = create_test_tensor_with_grad(vec![1.0, 4.0, 3.0, 8.0, 2.0, 5.0], vec![2, 3]);
    let (values, _) = max_dim(&t, 1, false).unwrap();
    assert!(values.requires_grad());
    let grad_fn = values.grad_fn().unwrap();
    let grads = grad_fn
        .backward(&Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap())
        .unwrap();
    check_tensor_near(&grads[0], &[2, 3], &[0.0, 1.0, 0.0, 2.0, 0.0, 0.0], 0.0);

    let output_grad = Tensor::new_f64(vec![0.5, -1.5], vec![2]).unwrap();
    check_grad(
        |inputs| Ok(max_dim(&inputs[0], 1, false)?.0),
        &[t],
        &output_grad,
        1e-6,
        1e-6,
    )
    .unwrap();
}
