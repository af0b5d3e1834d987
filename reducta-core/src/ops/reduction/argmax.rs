use crate::error::ReductaError;
use crate::named::propagate_names_for_reduction;
use crate::ops::reduction::axes::{resolve_axes, wrap_dim, AxisSpec};
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::resolve::get_reduction_shape;
use crate::ops::reduction::{finish, reduce_single};
use crate::tensor::{self, Tensor};
use crate::types::DType;

/// Index of the largest element along `dim`, or of the flattened input when
/// `dim` is `None`. Ties give the earliest index and the first NaN counts as
/// the maximum. The result is `I64`.
///
/// # Errors
/// `EmptyReduction` when the reduced dimension (or the whole input, without
/// `dim`) is empty.
pub fn argmax_op(input: &Tensor, dim: Option<isize>, keepdim: bool) -> Result<Tensor, ReductaError> {
    arg_extreme(OpKind::ArgMax, input, dim, keepdim, OutputBuffer::NoOutput)
}

pub fn argmax_out(input: &Tensor, dim: Option<isize>, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    arg_extreme(OpKind::ArgMax, input, dim, keepdim, OutputBuffer::Existing(out))
}

/// Index of the smallest element; see [`argmax_op`].
pub fn argmin_op(input: &Tensor, dim: Option<isize>, keepdim: bool) -> Result<Tensor, ReductaError> {
    arg_extreme(OpKind::ArgMin, input, dim, keepdim, OutputBuffer::NoOutput)
}

pub fn argmin_out(input: &Tensor, dim: Option<isize>, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    arg_extreme(OpKind::ArgMin, input, dim, keepdim, OutputBuffer::Existing(out))
}

fn arg_extreme(
    op: OpKind,
    input: &Tensor,
    dim: Option<isize>,
    keepdim: bool,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let dtype = input.dtype();
    if dtype.is_complex() {
        return Err(ReductaError::UnsupportedDType {
            dtype,
            operation: op.name().to_string(),
            message: format!("{}(): complex values have no ordering", op.name()),
        });
    }
    if let Some(out_dtype) = out.dtype() {
        if out_dtype != DType::I64 {
            return Err(ReductaError::TypeMismatch {
                expected: DType::I64,
                actual: out_dtype,
                operation: op.name().to_string(),
            });
        }
    }
    let shape = input.shape();
    let args = KernelArgs::default();

    let result = match dim {
        Some(d) => {
            let wrapped = wrap_dim(d, shape.len())?;
            let size = shape.get(wrapped).copied().unwrap_or(1);
            if size == 0 {
                return Err(ReductaError::EmptyReduction {
                    operation: op.name().to_string(),
                    message: format!(
                        "{}(): Expected reduction dim {} to have non-zero size.",
                        op.name(),
                        wrapped
                    ),
                });
            }
            if size == 1 {
                // Every lane has a single candidate.
                let axes = resolve_axes(&AxisSpec::Single(d), shape.len())?;
                let zeros = tensor::zeros(&get_reduction_shape(&shape, &axes, keepdim), DType::I64)?;
                zeros.set_names(propagate_names_for_reduction(&input.names(), &axes, keepdim));
                zeros
            } else {
                reduce_single(
                    op,
                    input,
                    &AxisSpec::Single(d),
                    keepdim,
                    dtype,
                    None,
                    OutputSpec::new(OutputBuffer::NoOutput, DType::I64),
                    &args,
                )?
            }
        }
        None => {
            let numel = input.numel();
            if numel == 0 {
                return Err(ReductaError::EmptyReduction {
                    operation: op.name().to_string(),
                    message: format!(
                        "{}(): Expected reduction dim to be specified for input.numel() == 0.",
                        op.name()
                    ),
                });
            }
            let flat = input.reshape(&[numel])?;
            let index = reduce_single(
                op,
                &flat,
                &AxisSpec::All,
                false,
                dtype,
                None,
                OutputSpec::new(OutputBuffer::NoOutput, DType::I64),
                &args,
            )?;
            if keepdim {
                index.reshape(&vec![1; shape.len()])?
            } else {
                index
            }
        }
    };
    finish(out, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_argmax_argmin_along_dim() {
        let t = Tensor::new(vec![1.0, 9.0, 9.0, 4.0, -2.0, 4.0], vec![2, 3]).unwrap();
        assert_eq!(argmax_op(&t, Some(1), false).unwrap().to_vec::<i64>().unwrap(), vec![1, 0]);
        assert_eq!(argmin_op(&t, Some(1), false).unwrap().to_vec::<i64>().unwrap(), vec![0, 1]);
        let kept = argmax_op(&t, Some(0), true).unwrap();
        assert_eq!(kept.shape(), vec![1, 3]);
        assert_eq!(kept.to_vec::<i64>().unwrap(), vec![1, 0, 0]);
    }

    #[test]
    fn test_argmax_flattened() {
        let t = Tensor::new_i32(vec![3, 8, 8, 1], vec![2, 2]).unwrap();
        let idx = argmax_op(&t, None, false).unwrap();
        assert_eq!(idx.shape(), Vec::<usize>::new());
        assert_eq!(idx.item::<i64>().unwrap(), 1);
        let kept = argmin_op(&t, None, true).unwrap();
        assert_eq!(kept.shape(), vec![1, 1]);
        assert_eq!(kept.item::<i64>().unwrap(), 3);
    }

    #[test]
    fn test_first_nan_wins() {
        let t = Tensor::new_f64(vec![1.0, f64::NAN, 5.0, f64::NAN], vec![4]).unwrap();
        assert_eq!(argmax_op(&t, None, false).unwrap().item::<i64>().unwrap(), 1);
        assert_eq!(argmin_op(&t, Some(0), false).unwrap().item::<i64>().unwrap(), 1);
    }

    #[test]
    fn test_size_one_dim_is_zero() {
        let t = Tensor::new(vec![5.0, 6.0], vec![2, 1])
            .unwrap()
            .with_names(&[Some("rows"), None])
            .unwrap();
        let idx = argmax_op(&t, Some(-1), false).unwrap();
        assert_eq!(idx.to_vec::<i64>().unwrap(), vec![0, 0]);
        assert_eq!(idx.names(), Some(vec![Some("rows".to_string())]));
    }

    #[test]
    fn test_empty_inputs() {
        let t = Tensor::new(vec![], vec![0, 2]).unwrap();
        let err = argmax_op(&t, None, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
        assert!(argmin_op(&t, Some(0), false).is_err());
        assert_eq!(argmin_op(&t, Some(1), false).unwrap().shape(), vec![0]);
    }

    #[test]
    fn test_argmax_out_requires_i64() {
        let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let bad = Tensor::new_i32(vec![0], vec![1]).unwrap();
        assert_eq!(argmax_out(&t, None, false, &bad).unwrap_err().kind(), ErrorKind::TypeMismatch);
        let out = Tensor::new_i64(vec![7, 7, 7], vec![3]).unwrap();
        argmax_out(&t, Some(0), false, &out).unwrap();
        assert_eq!(out.shape(), Vec::<usize>::new());
        assert_eq!(out.item::<i64>().unwrap(), 1);
    }
}
