use std::sync::{Arc, RwLock};

use crate::autograd::backward::cumprod_backward;
use crate::autograd::{is_create_graph_enabled, BackwardOp};
use crate::error::ReductaError;
use crate::named::dimname_to_position;
use crate::ops::cumulative::{run_scan, single_output};
use crate::ops::dtype::cast_op;
use crate::ops::reduction::dispatch::OpKind;
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Backward context for `cumprod`.
///
/// Keeps detached handles on the input and the forward result. The formula
/// switches to its second-order form while a
/// [`CreateGraphGuard`](crate::autograd::CreateGraphGuard) is active.
#[derive(Debug)]
struct CumprodBackward {
    input_node: Arc<RwLock<TensorData>>,
    input: Tensor,
    output: Tensor,
    dim: isize,
}

impl BackwardOp for CumprodBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, ReductaError> {
        let dtype = self.input.dtype();
        let grad = cast_op(grad_output, dtype)?;
        let output = cast_op(&self.output, dtype)?;
        let grad_input = cumprod_backward(&grad, &self.input, self.dim, &output, is_create_graph_enabled())?;
        Ok(vec![grad_input])
    }

    fn inputs(&self) -> Vec<*const RwLock<TensorData>> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}

/// Running sum along `dim`.
///
/// The accumulation dtype is `dtype` if given, else the dtype of `out`, else
/// `I64` for bool and integer inputs and the input dtype otherwise.
///
/// # Example
/// ```
/// use reducta_core::tensor::Tensor;
/// use reducta_core::ops::cumulative::cumsum_op;
///
/// let t = Tensor::new_i32(vec![1, 2, 3], vec![3]).unwrap();
/// let c = cumsum_op(&t, 0, None).unwrap();
/// assert_eq!(c.to_vec::<i64>().unwrap(), vec![1, 3, 6]);
/// ```
pub fn cumsum_op(input: &Tensor, dim: isize, dtype: Option<DType>) -> Result<Tensor, ReductaError> {
    cum_impl(OpKind::CumSum, input, dim, dtype, OutputBuffer::NoOutput)
}

pub fn cumsum_out(input: &Tensor, dim: isize, dtype: Option<DType>, out: &Tensor) -> Result<Tensor, ReductaError> {
    cum_impl(OpKind::CumSum, input, dim, dtype, OutputBuffer::Existing(out))
}

pub fn cumsum_named(input: &Tensor, name: &str, dtype: Option<DType>) -> Result<Tensor, ReductaError> {
    cumsum_op(input, dimname_to_position(input, name)?, dtype)
}

/// Running product along `dim`, with the same dtype rules as [`cumsum_op`].
///
/// When the input requires grad and the result keeps its dtype, a
/// `grad_fn` computing the cumprod gradient is attached.
pub fn cumprod_op(input: &Tensor, dim: isize, dtype: Option<DType>) -> Result<Tensor, ReductaError> {
    let output = cum_impl(OpKind::CumProd, input, dim, dtype, OutputBuffer::NoOutput)?;
    if input.requires_grad() && output.dtype() == input.dtype() {
        output.set_grad_fn(Arc::new(CumprodBackward {
            input_node: Arc::clone(&input.data),
            input: input.detach(),
            output: output.detach(),
            dim,
        }));
    }
    Ok(output)
}

pub fn cumprod_out(input: &Tensor, dim: isize, dtype: Option<DType>, out: &Tensor) -> Result<Tensor, ReductaError> {
    cum_impl(OpKind::CumProd, input, dim, dtype, OutputBuffer::Existing(out))
}

pub fn cumprod_named(input: &Tensor, name: &str, dtype: Option<DType>) -> Result<Tensor, ReductaError> {
    cumprod_op(input, dimname_to_position(input, name)?, dtype)
}

fn scan_dtype(input: DType, explicit: Option<DType>, out: Option<DType>) -> DType {
    explicit.or(out).unwrap_or(if input.is_integral(true) { DType::I64 } else { input })
}

fn cum_impl(
    op: OpKind,
    input: &Tensor,
    dim: isize,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let compute = scan_dtype(input.dtype(), dtype, out.dtype());
    let outputs = run_scan(op, input, dim, compute, dtype, &[OutputSpec::new(out, compute)])?;
    single_output(op, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::autograd::CreateGraphGuard;
    use crate::error::ErrorKind;
    use crate::ops::reduction::axes::AxisSpec;
    use crate::ops::reduction::sum::sum_op;
    use crate::utils::testing::{check_tensor_near, create_test_tensor_with_grad};

    #[test]
    fn test_cumsum_along_each_axis() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        check_tensor_near(&cumsum_op(&t, 1, None).unwrap(), &[2, 3], &[1.0, 3.0, 6.0, 4.0, 9.0, 15.0], 1e-6);
        check_tensor_near(&cumsum_op(&t, -2, None).unwrap(), &[2, 3], &[1.0, 2.0, 3.0, 5.0, 7.0, 9.0], 1e-6);
    }

    #[test]
    fn test_last_running_sum_equals_sum() {
        let t = Tensor::new_f64((0..24).map(|v| v as f64 * 0.5).collect(), vec![2, 3, 4]).unwrap();
        for dim in 0..3isize {
            let running = cumsum_op(&t, dim, None).unwrap();
            let last = running.select(dim, -1).unwrap();
            let total = sum_op(&t, &AxisSpec::Single(dim), false, None).unwrap();
            assert_eq!(last.to_vec_as::<f64>().unwrap(), total.to_vec::<f64>().unwrap());
        }
    }

    #[test]
    fn test_scan_dtype_resolution() {
        let b = Tensor::new_bool(vec![true, false, true], vec![3]).unwrap();
        let c = cumsum_op(&b, 0, None).unwrap();
        assert_eq!(c.dtype(), DType::I64);
        assert_eq!(c.to_vec::<i64>().unwrap(), vec![1, 1, 2]);

        let f = Tensor::new_i32(vec![1, 2], vec![2]).unwrap();
        assert_eq!(cumprod_op(&f, 0, Some(DType::F64)).unwrap().dtype(), DType::F64);

        let out = Tensor::new(vec![], vec![0]).unwrap();
        cumsum_out(&f, 0, None, &out).unwrap();
        check_tensor_near(&out, &[2], &[1.0, 3.0], 0.0);

        let err = cumsum_out(&f, 0, Some(DType::I64), &out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_rank0_and_empty() {
        let s = Tensor::scalar(4.0f32);
        assert_eq!(cumprod_op(&s, 0, None).unwrap().item::<f32>().unwrap(), 4.0);
        assert_eq!(cumsum_op(&s, -1, None).unwrap().shape(), Vec::<usize>::new());

        let e = Tensor::new(vec![], vec![3, 0]).unwrap();
        assert_eq!(cumprod_op(&e, 1, None).unwrap().shape(), vec![3, 0]);
        assert!(matches!(cumsum_op(&e, 2, None), Err(ReductaError::InvalidAxis { .. })));
    }

    #[test]
    fn test_cumprod_and_named() {
        let t = Tensor::new_f64(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2])
            .unwrap()
            .with_names(&[Some("rows"), Some("cols")])
            .unwrap();
        let c = cumprod_named(&t, "cols", None).unwrap();
        check_tensor_near(&c, &[2, 2], &[1.0, 2.0, 3.0, 12.0], 0.0);
        assert_eq!(c.names(), t.names());
        let s = cumsum_named(&t, "rows", None).unwrap();
        check_tensor_near(&s, &[2, 2], &[1.0, 2.0, 4.0, 6.0], 0.0);
    }

    #[test]
    fn test_cumprod_backward_matches_finite_differences() {
        let x = create_test_tensor_with_grad(vec![0.5, -1.5, 2.0, 1.25, 3.0, -0.75], vec![2, 3]);
        let output_grad = Tensor::new_f64(vec![1.0, -0.5, 0.25, 2.0, 1.0, -1.0], vec![2, 3]).unwrap();
        check_grad(|inputs| cumprod_op(&inputs[0], 1, None), &[x.clone()], &output_grad, 1e-6, 1e-5).unwrap();
        check_grad(|inputs| cumprod_op(&inputs[0], 0, None), &[x], &output_grad, 1e-6, 1e-5).unwrap();
    }

    #[test]
    fn test_cumprod_backward_with_a_zero() {
        let x = create_test_tensor_with_grad(vec![2.0, 0.0, 3.0], vec![3]);
        let y = cumprod_op(&x, 0, None).unwrap();
        let grad = Tensor::new_f64(vec![1.0, 1.0, 1.0], vec![3]).unwrap();
        let grad_fn = y.grad_fn().unwrap();
        // y = [2, 0, 0]: d/dx0 = 1, d/dx1 = 2 + 2*3, d/dx2 = 0
        let linear = grad_fn.backward(&grad).unwrap();
        check_tensor_near(&linear[0], &[3], &[1.0, 8.0, 0.0], 1e-12);
        let _guard = CreateGraphGuard::new(true);
        let quadratic = grad_fn.backward(&grad).unwrap();
        check_tensor_near(&quadratic[0], &[3], &[1.0, 8.0, 0.0], 1e-12);
    }
}
