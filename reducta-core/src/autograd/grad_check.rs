use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::arithmetic::mul_op;
use crate::ops::dtype::cast_op;
use crate::ops::reduction::axes::AxisSpec;
use crate::ops::reduction::sum::sum_op;
use crate::tensor::Tensor;
use crate::types::DType;
use std::sync::Arc;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(ReductaError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(ReductaError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(ReductaError),
    #[error("Unsupported data type for gradient check: expected F32 or F64, got {0:?}")]
    UnsupportedDType(DType),
    #[error("Input tensor {input_index} requires grad but the output's backward node does not use it")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Gradient checking only supported on CPU tensors (Input {input_index}). Got: {device:?}")]
    NonCpuInput {
        input_index: usize,
        device: StorageDevice,
    },
    #[error("Gradient check input tensor must be a leaf node (no grad_fn). Input index: {input_index}")]
    InputNotLeaf { input_index: usize },
    #[error("Function did not attach a backward node to its output.")]
    RequiresGradPropagationError,
}

impl From<ReductaError> for GradCheckError {
    fn from(err: ReductaError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks the analytical gradient of `func` against central finite differences.
///
/// The scalar loss is `sum(func(inputs) * output_grad)`. The analytical
/// gradient comes from calling the output's `grad_fn` once with `output_grad`;
/// each input that requires grad is matched to a returned gradient through
/// [`BackwardOp::inputs`](crate::autograd::BackwardOp::inputs).
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, ReductaError>,
{
    for (i, input) in inputs.iter().enumerate() {
        let dtype = input.dtype();
        if !dtype.is_floating_point() {
            return Err(GradCheckError::UnsupportedDType(dtype));
        }
        let device = input.device();
        if device != StorageDevice::CPU {
            return Err(GradCheckError::NonCpuInput { input_index: i, device });
        }
        if input.requires_grad() && input.grad_fn().is_some() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
    }
    if !output_grad.dtype().is_floating_point() {
        return Err(GradCheckError::UnsupportedDType(output_grad.dtype()));
    }

    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;
    let grad_fn = output
        .grad_fn()
        .ok_or(GradCheckError::RequiresGradPropagationError)?;
    let analytical = grad_fn
        .backward(output_grad)
        .map_err(GradCheckError::BackwardPassError)?;
    let node_inputs = grad_fn.inputs();

    for (i, original_input) in inputs.iter().enumerate() {
        if !original_input.requires_grad() {
            continue;
        }
        let node_index = node_inputs
            .iter()
            .position(|&ptr| ptr == Arc::as_ptr(&original_input.data))
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?;
        let analytical_grad_data = analytical
            .get(node_index)
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?
            .to_vec_as::<f64>()?;

        let original_data = original_input.to_vec_as::<f64>()?;
        let perturbed_loss = |elem_idx: usize, delta: f64| -> Result<f64, GradCheckError> {
            let mut data = original_data.clone();
            data[elem_idx] += delta;
            let perturbed = cast_op(
                &Tensor::new_f64(data, original_input.shape())?,
                original_input.dtype(),
            )?;
            let mut perturbed_inputs = inputs.to_vec();
            perturbed_inputs[i] = perturbed;
            let out = func(&perturbed_inputs).map_err(GradCheckError::ForwardPassError)?;
            calculate_loss(&out, output_grad)
        };

        for (elem_idx, &analytical_grad) in analytical_grad_data.iter().enumerate() {
            let loss_plus = perturbed_loss(elem_idx, epsilon)?;
            let loss_minus = perturbed_loss(elem_idx, -epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }

            let difference = (analytical_grad - numerical_grad).abs();
            if !(difference <= tolerance || difference / (analytical_grad.abs() + epsilon) <= tolerance) {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad,
                    numerical_grad,
                    difference,
                });
            }
        }
    }

    Ok(())
}

/// `sum(output * output_grad)` as an `f64`.
fn calculate_loss(output: &Tensor, output_grad: &Tensor) -> Result<f64, GradCheckError> {
    if output.shape() != output_grad.shape() {
        return Err(GradCheckError::TensorError(ReductaError::ShapeMismatch {
            expected: output.shape(),
            actual: output_grad.shape(),
            operation: "calculate_loss (grad_check)".to_string(),
        }));
    }
    let weights = cast_op(output_grad, output.dtype())?;
    let weighted = mul_op(output, &weights)?;
    let loss = sum_op(&weighted, &AxisSpec::All, false, Some(DType::F64))?;
    Ok(loss.item::<f64>()?)
}
