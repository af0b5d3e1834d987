use super::*;
use crate::error::ErrorKind;
use crate::types::DType;
use crate::utils::testing::check_tensor_near;
use approx::assert_relative_eq;
use num_complex::Complex;

#[test]
fn test_var_and_std_default_correction() -> Result<(), ReductaError> {
    let t = Tensor::new_f64(vec![1.0, 2.0, 3.0, 4.0], vec![4])?;
    assert_relative_eq!(var_op(&t, &AxisSpec::All, None, false)?.item::<f64>()?, 5.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(var_op(&t, &AxisSpec::All, Some(0), false)?.item::<f64>()?, 1.25, epsilon = 1e-12);
    assert_relative_eq!(std_op(&t, &AxisSpec::All, Some(0), false)?.item::<f64>()?, 1.25f64.sqrt(), epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_var_along_axis() -> Result<(), ReductaError> {
    let t = Tensor::new(vec![1.0, 2.0, 3.0, 5.0], vec![2, 2])?;
    check_tensor_near(&var_op(&t, &AxisSpec::Single(1), None, false)?, &[2], &[0.5, 2.0], 1e-6);
    check_tensor_near(&std_op(&t, &AxisSpec::Single(0), Some(0), true)?, &[1, 2], &[1.0, 1.5], 1e-6);
    Ok(())
}

#[test]
fn test_var_mean() {
    let t = Tensor::new_f64(vec![2.0, 4.0, 6.0, 1.0, 1.0, 1.0], vec![2, 3]).unwrap();
    let (var, mean) = var_mean_op(&t, &AxisSpec::Single(1), None, false).unwrap();
    check_tensor_near(&var, &[2], &[4.0, 0.0], 1e-12);
    check_tensor_near(&mean, &[2], &[4.0, 1.0], 1e-12);

    let (std, mean) = std_mean_op(&t, &AxisSpec::All, Some(0), true).unwrap();
    assert_eq!(std.shape(), vec![1, 1]);
    assert_relative_eq!(mean.item::<f64>().unwrap(), 2.5, epsilon = 1e-12);
}

#[test]
fn test_complex_variance_sums_parts() {
    let t = Tensor::new_complex64(vec![Complex::new(1.0, 1.0), Complex::new(3.0, -1.0)], vec![2]).unwrap();
    let var = var_op(&t, &AxisSpec::All, None, false).unwrap();
    assert_eq!(var.dtype(), DType::F32);
    assert_relative_eq!(var.item::<f32>().unwrap(), 4.0, epsilon = 1e-6);
    let std = std_op(&t, &AxisSpec::All, None, false).unwrap();
    assert_relative_eq!(std.item::<f32>().unwrap(), 2.0, epsilon = 1e-6);

    let (_, mean) = var_mean_op(&t, &AxisSpec::All, None, false).unwrap();
    assert_eq!(mean.dtype(), DType::Complex64);
    assert_eq!(mean.item::<Complex<f32>>().unwrap(), Complex::new(2.0, 0.0));
}

#[test]
fn test_empty_and_single_element_give_nan() {
    let empty = Tensor::new(vec![], vec![0]).unwrap();
    assert!(var_op(&empty, &AxisSpec::All, None, false).unwrap().item::<f32>().unwrap().is_nan());
    let (_, mean) = var_mean_op(&empty, &AxisSpec::All, None, false).unwrap();
    assert!(mean.item::<f32>().unwrap().is_nan());

    let single = Tensor::scalar(3.0f64);
    assert!(var_op(&single, &AxisSpec::All, None, false).unwrap().item::<f64>().unwrap().is_nan());
    assert_eq!(var_op(&single, &AxisSpec::All, Some(0), false).unwrap().item::<f64>().unwrap(), 0.0);
}

#[test]
fn test_integral_input_is_rejected() {
    let t = Tensor::new_i32(vec![1, 2], vec![2]).unwrap();
    match var_op(&t, &AxisSpec::All, None, false).unwrap_err() {
        ReductaError::UnsupportedDType { message, .. } => {
            assert_eq!(message, "std and var only support floating point and complex dtypes")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_legacy_unbiased_flag() {
    let t = Tensor::new_f64(vec![1.0, 3.0], vec![2]).unwrap();
    assert_relative_eq!(var_unbiased(&t, &AxisSpec::All, true, false).unwrap().item::<f64>().unwrap(), 2.0);
    assert_relative_eq!(var_unbiased(&t, &AxisSpec::All, false, false).unwrap().item::<f64>().unwrap(), 1.0);
    assert_relative_eq!(std_unbiased(&t, &AxisSpec::All, false, false).unwrap().item::<f64>().unwrap(), 1.0);
    let (v, m) = var_mean_unbiased(&t, &AxisSpec::All, false, false).unwrap();
    assert_relative_eq!(v.item::<f64>().unwrap(), 1.0);
    assert_relative_eq!(m.item::<f64>().unwrap(), 2.0);
    let (s, _) = std_mean_unbiased(&t, &AxisSpec::All, true, false).unwrap();
    assert_relative_eq!(s.item::<f64>().unwrap(), 2f64.sqrt());
}

#[test]
fn test_out_variants() {
    let t = Tensor::new_f64(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let out = Tensor::new_f64(vec![], vec![0]).unwrap();
    var_out(&t, &AxisSpec::Single(0), Some(0), false, &out).unwrap();
    check_tensor_near(&out, &[2], &[1.0, 1.0], 1e-12);
    std_out(&t, &AxisSpec::All, Some(0), false, &out).unwrap();
    check_tensor_near(&out, &[], &[1.25f64.sqrt()], 1e-12);

    let wrong = Tensor::new(vec![0.0], vec![1]).unwrap();
    let err = var_out(&t, &AxisSpec::All, None, false, &wrong).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_named_variants() {
    let t = Tensor::new_f64(vec![1.0, 3.0, 2.0, 2.0], vec![2, 2])
        .unwrap()
        .with_names(&[Some("N"), Some("F")])
        .unwrap();
    let v = var_named(&t, &["F"], Some(0), false).unwrap();
    check_tensor_near(&v, &[2], &[1.0, 0.0], 1e-12);
    assert_eq!(v.names(), Some(vec![Some("N".to_string())]));
    let s = std_named(&t, &["N"], Some(0), false).unwrap();
    check_tensor_near(&s, &[2], &[0.5, 0.5], 1e-12);
}

#[test]
fn test_whole_tensor_parallel_path_matches_lanes() {
    let n = 100_003;
    let data: Vec<f64> = (0..n).map(|i| ((i * 37) % 1000) as f64 / 7.0).collect();
    let t = Tensor::new_f64(data.clone(), vec![n]).unwrap();
    let whole = var_op(&t, &AxisSpec::All, None, false).unwrap().item::<f64>().unwrap();

    let mean = data.iter().sum::<f64>() / n as f64;
    let expected = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64;
    assert_relative_eq!(whole, expected, max_relative = 1e-10);

    // Same data split into two lanes goes through the kernel.
    let split = Tensor::new_f64(data[..100_000].to_vec(), vec![2, 50_000]).unwrap();
    let lanes = var_op(&split, &AxisSpec::Single(1), None, false).unwrap();
    assert_eq!(lanes.shape(), vec![2]);
}
