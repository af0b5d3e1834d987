//! Logical reductions `all` and `any`.

use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::named::propagate_names_for_reduction;
use crate::ops::dtype::cast_op;
use crate::ops::math_elem::ne_zero_op;
use crate::ops::reduction::axes::{resolve_axes, AxisSpec};
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::resolve::{get_reduction_shape, resolve_bool_or_byte_dtype};
use crate::ops::reduction::{finish, reduce_single};
use crate::tensor::Tensor;

/// `true` where every reduced element is non-zero. `all` of nothing is `true`.
///
/// The result is `Bool`, or `U8` for `U8` inputs.
pub fn all_op(input: &Tensor, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
    logical_reduce(OpKind::And, input, axes, keepdim, OutputBuffer::NoOutput)
}

/// # Errors
/// `TypeMismatch` if `out` is neither `Bool` nor `U8`.
pub fn all_out(input: &Tensor, axes: &AxisSpec, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    logical_reduce(OpKind::And, input, axes, keepdim, OutputBuffer::Existing(out))
}

/// `true` where some reduced element is non-zero. `any` of nothing is `false`.
pub fn any_op(input: &Tensor, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
    logical_reduce(OpKind::Or, input, axes, keepdim, OutputBuffer::NoOutput)
}

pub fn any_out(input: &Tensor, axes: &AxisSpec, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    logical_reduce(OpKind::Or, input, axes, keepdim, OutputBuffer::Existing(out))
}

/// Always fails: `all` has no named-dimension form.
pub fn all_named(_input: &Tensor, name: &str, _keepdim: bool) -> Result<Tensor, ReductaError> {
    Err(ReductaError::UnsupportedOperation(format!(
        "all: reducing over named dimension '{}' is not supported",
        name
    )))
}

/// Always fails: `any` has no named-dimension form.
pub fn any_named(_input: &Tensor, name: &str, _keepdim: bool) -> Result<Tensor, ReductaError> {
    Err(ReductaError::UnsupportedOperation(format!(
        "any: reducing over named dimension '{}' is not supported",
        name
    )))
}

fn logical_reduce(
    op: OpKind,
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let result_dtype = resolve_bool_or_byte_dtype(input.dtype(), out.dtype(), op.name())?;
    let on_cpu = |t: &Tensor| t.device() == StorageDevice::CPU;
    // A single element reduces to its own truth value without a kernel.
    if input.numel() == 1 && on_cpu(input) && out.tensor().map_or(true, on_cpu) {
        log::trace!("{}: single element, reducing its truth value", op.name());
        let axis_set = resolve_axes(axes, input.rank())?;
        let shape = get_reduction_shape(&input.shape(), &axis_set, keepdim);
        let truth = cast_op(&ne_zero_op(input)?, result_dtype)?.reshape(&shape)?;
        truth.set_names(propagate_names_for_reduction(&input.names(), &axis_set, keepdim));
        return finish(out, truth);
    }
    reduce_single(
        op,
        input,
        axes,
        keepdim,
        input.dtype(),
        None,
        OutputSpec::new(out, result_dtype),
        &KernelArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::DType;

    #[test]
    fn test_all_and_any_along_axis() {
        let t = Tensor::new(vec![1.0, 0.0, 2.0, 3.0], vec![2, 2]).unwrap();
        let all = all_op(&t, &AxisSpec::Single(1), false).unwrap();
        assert_eq!(all.dtype(), DType::Bool);
        assert_eq!(all.to_vec::<bool>().unwrap(), vec![false, true]);
        let any = any_op(&t, &AxisSpec::Single(0), true).unwrap();
        assert_eq!(any.shape(), vec![1, 2]);
        assert_eq!(any.to_vec::<bool>().unwrap(), vec![true, true]);
    }

    #[test]
    fn test_empty_identities() {
        let t = Tensor::new(vec![], vec![3, 0]).unwrap();
        assert_eq!(all_op(&t, &AxisSpec::Single(1), false).unwrap().to_vec::<bool>().unwrap(), vec![true; 3]);
        assert_eq!(any_op(&t, &AxisSpec::Single(1), false).unwrap().to_vec::<bool>().unwrap(), vec![false; 3]);
    }

    #[test]
    fn test_byte_input_keeps_byte_output() {
        let t = Tensor::new_u8(vec![3, 0, 7], vec![3]).unwrap();
        let any = any_op(&t, &AxisSpec::All, false).unwrap();
        assert_eq!(any.dtype(), DType::U8);
        assert_eq!(any.item::<u8>().unwrap(), 1);
        assert_eq!(all_op(&t, &AxisSpec::All, false).unwrap().item::<u8>().unwrap(), 0);
    }

    #[test]
    fn test_single_element_uses_truthiness() {
        let half = Tensor::scalar(0.5f32);
        let out = Tensor::new_u8(vec![], vec![0]).unwrap();
        any_out(&half, &AxisSpec::All, false, &out).unwrap();
        assert_eq!(out.item::<u8>().unwrap(), 1);
        let one = Tensor::new(vec![0.0], vec![1]).unwrap();
        assert!(!all_op(&one, &AxisSpec::Single(0), false).unwrap().item::<bool>().unwrap());
    }

    #[test]
    fn test_single_element_shapes_names_and_out() {
        let t = Tensor::new_i32(vec![-3], vec![1, 1])
            .unwrap()
            .with_names(&[Some("a"), Some("b")])
            .unwrap();
        let kept = any_op(&t, &AxisSpec::Single(0), true).unwrap();
        assert_eq!(kept.shape(), vec![1, 1]);
        assert_eq!(kept.dtype(), DType::Bool);
        assert_eq!(kept.names(), Some(vec![None, Some("b".to_string())]));
        let dropped = all_op(&t, &AxisSpec::Single(-1), false).unwrap();
        assert_eq!(dropped.shape(), vec![1]);
        assert_eq!(dropped.names(), Some(vec![Some("a".to_string())]));
        assert!(dropped.to_vec::<bool>().unwrap()[0]);

        let out = Tensor::new_bool(vec![], vec![0]).unwrap();
        all_out(&Tensor::new_f64(vec![0.0], vec![1]).unwrap(), &AxisSpec::All, false, &out).unwrap();
        assert_eq!(out.shape(), Vec::<usize>::new());
        assert!(!out.item::<bool>().unwrap());
    }

    #[test]
    fn test_out_must_be_bool_or_byte() {
        let t = Tensor::new(vec![1.0, 1.0], vec![2]).unwrap();
        let out = Tensor::new(vec![0.0], vec![1]).unwrap();
        let err = all_out(&t, &AxisSpec::All, false, &out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_named_forms_are_unsupported() {
        let t = Tensor::new(vec![1.0], vec![1]).unwrap().with_names(&[Some("x")]).unwrap();
        assert_eq!(all_named(&t, "x", false).unwrap_err().kind(), ErrorKind::UnsupportedOperation);
        assert_eq!(any_named(&t, "x", true).unwrap_err().kind(), ErrorKind::UnsupportedOperation);
    }
}
