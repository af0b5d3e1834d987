use reducta_core::error::{ErrorKind, ReductaError};
use reducta_core::ops::reduction::axes::AxisSpec;
use reducta_core::ops::reduction::prod::prod_op;
use reducta_core::ops::reduction::sum::sum_op;
use reducta_core::tensor::{self, Tensor};
use reducta_core::DType;

mod common;
use common::{assert_close, create_test_tensor};

#[test]
fn test_keepdim_shapes() {
    let x = tensor::randn(&[2, 3, 4], DType::F64).unwrap();
    for axes in [vec![0isize], vec![1], vec![-1], vec![0, 2], vec![2, 0, 1]] {
        let kept = x.sum(&AxisSpec::List(axes.clone()), true).unwrap();
        let dropped = x.sum(&AxisSpec::List(axes.clone()), false).unwrap();
        let reduced: Vec<usize> = axes.iter().map(|&a| a.rem_euclid(3) as usize).collect();
        let expected_kept: Vec<usize> = (0..3)
            .map(|i| if reduced.contains(&i) { 1 } else { x.shape()[i] })
            .collect();
        let expected_dropped: Vec<usize> = (0..3)
            .filter(|i| !reduced.contains(i))
            .map(|i| x.shape()[i])
            .collect();
        assert_eq!(kept.shape(), expected_kept);
        assert_eq!(dropped.shape(), expected_dropped);
    }
}

#[test]
fn test_empty_axis_list_reduces_everything() {
    for shape in [vec![], vec![5], vec![2, 3], vec![2, 1, 3]] {
        let x = tensor::rand(&shape, DType::F64).unwrap();
        let a = x.sum(&AxisSpec::List(vec![]), false).unwrap();
        let b = x.sum(&AxisSpec::All, false).unwrap();
        assert!(a.equal(&b).unwrap());
    }
}

#[test]
fn test_empty_tensor_identities() {
    let x = create_test_tensor(vec![], vec![0, 3]);
    assert_eq!(x.sum(&AxisSpec::All, false).unwrap().item::<f64>().unwrap(), 0.0);
    assert_eq!(x.prod(&AxisSpec::All, false).unwrap().item::<f64>().unwrap(), 1.0);
    assert!(x.all(&AxisSpec::All, false).unwrap().item::<bool>().unwrap());
    assert!(!x.any(&AxisSpec::All, false).unwrap().item::<bool>().unwrap());

    let err = x.amax(&AxisSpec::Single(0), false).unwrap_err();
    assert!(matches!(err, ReductaError::EmptyReduction { .. }));
    assert_eq!(x.amin(&AxisSpec::Single(0), false).unwrap_err().kind(), ErrorKind::Index);
    // Reducing the non-empty axis is fine.
    assert_eq!(x.amax(&AxisSpec::Single(1), false).unwrap().shape(), vec![0]);
}

#[test]
fn test_sum_and_mean_scenario() {
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    assert_eq!(x.sum(&AxisSpec::Single(0), false).unwrap().to_vec::<f64>().unwrap(), vec![4.0, 6.0]);
    assert_eq!(x.sum(&AxisSpec::Single(1), false).unwrap().to_vec::<f64>().unwrap(), vec![3.0, 7.0]);
    assert_eq!(x.mean(&AxisSpec::All, false).unwrap().item::<f64>().unwrap(), 2.5);
}

#[test]
fn test_norm_logsumexp_var_scenario() {
    let x = create_test_tensor(vec![3.0, 4.0], vec![2]);
    assert_eq!(x.norm(2.0, &AxisSpec::All, false).unwrap().item::<f64>().unwrap(), 5.0);

    let zeros = create_test_tensor(vec![0.0, 0.0], vec![2]);
    let lse = zeros.logsumexp(&AxisSpec::All, false).unwrap().item::<f64>().unwrap();
    assert!((lse - 2f64.ln()).abs() < 1e-12);

    let v = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![4]);
    let unbiased = v.var(&AxisSpec::All, Some(1), false).unwrap().item::<f64>().unwrap();
    assert!((unbiased - 5.0 / 3.0).abs() < 1e-12);
    assert_eq!(v.var(&AxisSpec::All, Some(0), false).unwrap().item::<f64>().unwrap(), 1.25);
    assert_close(
        &v.std(&AxisSpec::All, Some(0), false).unwrap().to_vec::<f64>().unwrap(),
        &[1.25f64.sqrt()],
        1e-12,
    );
}

#[test]
fn test_argmax_gathers_amax() {
    let x = create_test_tensor(vec![0.3, -1.0, 7.5, 2.0, 9.0, 4.0], vec![2, 3]);
    let idx = x.argmax(Some(1), false).unwrap().to_vec::<i64>().unwrap();
    let amax = x.amax(&AxisSpec::Single(1), false).unwrap().to_vec::<f64>().unwrap();
    let data = x.to_vec::<f64>().unwrap();
    for (row, &i) in idx.iter().enumerate() {
        assert_eq!(data[row * 3 + i as usize], amax[row]);
    }

    let ties = create_test_tensor(vec![3.0, 1.0, 3.0], vec![3]);
    assert_eq!(ties.argmax(None, false).unwrap().item::<i64>().unwrap(), 0);
}

#[test]
fn test_integral_sum_widens() {
    let x = Tensor::new_i32(vec![i32::MAX, 1], vec![2]).unwrap();
    let s = sum_op(&x, &AxisSpec::All, false, None).unwrap();
    assert_eq!(s.dtype(), DType::I64);
    assert_eq!(s.item::<i64>().unwrap(), i32::MAX as i64 + 1);
    let b = Tensor::new_bool(vec![true, true, false], vec![3]).unwrap();
    assert_eq!(prod_op(&b, &AxisSpec::All, false, None).unwrap().item::<i64>().unwrap(), 0);
}

#[test]
fn test_trace_and_equal() {
    let m = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    assert_eq!(m.trace().unwrap().item::<f64>().unwrap(), 5.0);
    assert!(m.equal(&m.transpose(0, 1).unwrap().transpose(0, 1).unwrap()).unwrap());
    assert!(!m.equal(&m.transpose(0, 1).unwrap()).unwrap());
}
