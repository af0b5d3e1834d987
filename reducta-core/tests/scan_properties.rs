use reducta_core::autograd::grad_check::check_grad;
use reducta_core::ops::cumulative::cumprod_op;
use reducta_core::ops::reduction::axes::AxisSpec;
use reducta_core::tensor::{self, Tensor};
use reducta_core::DType;

mod common;
use common::{assert_close, create_test_tensor};

#[test]
fn test_concrete_scan_scenario() {
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![4]);
    assert_eq!(x.cumsum(0).unwrap().to_vec::<f64>().unwrap(), vec![1.0, 3.0, 6.0, 10.0]);
    assert_eq!(x.cumprod(0).unwrap().to_vec::<f64>().unwrap(), vec![1.0, 2.0, 6.0, 24.0]);
    let (values, indices) = x.cummax(0).unwrap();
    assert_eq!(values.to_vec::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(indices.to_vec::<i64>().unwrap(), vec![0, 1, 2, 3]);
}

#[test]
fn test_last_cumsum_equals_sum() {
    let x = tensor::randn(&[3, 4, 5], DType::F64).unwrap();
    for dim in 0..3isize {
        let last = x.cumsum(dim).unwrap().select(dim, -1).unwrap();
        let total = x.sum(&AxisSpec::Single(dim), false).unwrap();
        assert_eq!(last.shape(), total.shape());
        assert_close(&last.to_vec::<f64>().unwrap(), &total.to_vec::<f64>().unwrap(), 1e-10);
    }
}

#[test]
fn test_cummax_monotonic_then_nan() {
    let x = tensor::randn(&[4, 6], DType::F64).unwrap();
    let (values, _) = x.cummax(1).unwrap();
    let v = values.to_vec::<f64>().unwrap();
    for row in v.chunks(6) {
        assert!(row.windows(2).all(|w| w[1] >= w[0]));
    }

    let with_nan = create_test_tensor(vec![1.0, f64::NAN, 5.0, f64::NAN, 2.0], vec![5]);
    let (values, indices) = with_nan.cummax(0).unwrap();
    let v = values.to_vec::<f64>().unwrap();
    assert_eq!(v[0], 1.0);
    assert!(v[1..].iter().all(|x| x.is_nan()));
    assert_eq!(indices.to_vec::<i64>().unwrap(), vec![0, 1, 1, 3, 3]);
}

#[test]
fn test_cumprod_backward_matches_finite_differences() {
    let base = tensor::rand(&[3, 5], DType::F64).unwrap().to_vec::<f64>().unwrap();
    // Keep entries away from zero.
    let data: Vec<f64> = base.iter().map(|v| v + 0.5).collect();
    let x = Tensor::new_f64(data, vec![3, 5]).unwrap();
    x.set_requires_grad(true).unwrap();
    let output_grad = tensor::randn(&[3, 5], DType::F64).unwrap();
    for dim in [0isize, 1] {
        check_grad(|inputs| cumprod_op(&inputs[0], dim, None), &[x.clone()], &output_grad, 1e-6, 1e-5).unwrap();
    }
}

#[test]
fn test_diff_properties() {
    let x = create_test_tensor(vec![1.0, 4.0, 9.0, 16.0, 2.0, 3.0, 5.0, 8.0], vec![2, 4]);
    let d = x.diff(1, 1).unwrap();
    assert_eq!(d.to_vec::<f64>().unwrap(), vec![3.0, 5.0, 7.0, 1.0, 2.0, 3.0]);
    assert!(x.diff(0, 1).unwrap().equal(&x).unwrap());
}

#[test]
fn test_gradient_of_linear_is_constant() {
    let x = create_test_tensor(vec![0.0, 2.0, 4.0, 6.0, 8.0], vec![5]);
    let grads = x.gradient(1).unwrap();
    assert_eq!(grads.len(), 1);
    assert_close(&grads[0].to_vec::<f64>().unwrap(), &[2.0; 5], 1e-12);
}
