use crate::tensor::Tensor;

/// Checks if a tensor is approximately equal to the expected shape and data.
/// Values are read back as `f64` whatever the tensor dtype; NaN matches NaN.
/// Panics if shapes differ or data differs significantly.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual
        .to_vec_as::<f64>()
        .expect("Failed to read CPU data in check_tensor_near");

    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        if a.is_nan() && e.is_nan() {
            continue;
        }
        let diff = (a - e).abs();
        if !(diff <= tolerance) && a != e {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Helper to create a simple f64 tensor for testing purposes.
pub fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new_f64(data, shape).expect("Failed to create test tensor")
}

/// Helper to create an f64 tensor that requires gradient for testing.
pub fn create_test_tensor_with_grad(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    let tensor = create_test_tensor(data, shape);
    tensor
        .set_requires_grad(true)
        .expect("Failed to enable gradients on test tensor");
    tensor
}
