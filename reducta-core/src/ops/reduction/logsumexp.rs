use crate::config::default_float_dtype;
use crate::error::ReductaError;
use crate::named::{dimnames_to_positions, propagate_names_for_reduction};
use crate::ops::arithmetic::{add_op, sub_op};
use crate::ops::dtype::cast_op;
use crate::ops::math_elem::{exp_op, ln_op, mask_infinite_op};
use crate::ops::reduction::axes::{resolve_axes, AxisSpec};
use crate::ops::reduction::max::amax_op;
use crate::ops::reduction::plan::OutputBuffer;
use crate::ops::reduction::resolve::get_reduction_shape;
use crate::ops::reduction::sum::sum_op;
use crate::ops::reduction::finish;
use crate::tensor::Tensor;

/// `log(sum(exp(x)))` over `axes`, computed as
/// `log(sum(exp(x - m))) + m` with `m` the lane maximum (infinite maxima
/// replaced by 0).
///
/// Integral inputs are promoted to the default float type. Zero elements give `-inf`.
///
/// # Errors
/// `UnsupportedDType` for complex inputs or a non floating `out`.
pub fn logsumexp_op(input: &Tensor, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
    logsumexp_impl(input, axes, keepdim, OutputBuffer::NoOutput)
}

pub fn logsumexp_out(input: &Tensor, axes: &AxisSpec, keepdim: bool, out: &Tensor) -> Result<Tensor, ReductaError> {
    logsumexp_impl(input, axes, keepdim, OutputBuffer::Existing(out))
}

pub fn logsumexp_named(input: &Tensor, names: &[&str], keepdim: bool) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    logsumexp_op(input, &AxisSpec::List(axes), keepdim)
}

fn logsumexp_impl(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    if let Some(out_dtype) = out.dtype() {
        if !out_dtype.is_floating_point() {
            return Err(ReductaError::UnsupportedDType {
                dtype: out_dtype,
                operation: "logsumexp".to_string(),
                message: format!(
                    "logsumexp(): Expected floating point type for result tensor, but got: {:?}",
                    out_dtype
                ),
            });
        }
    }
    let self_dtype = input.dtype();
    if self_dtype.is_complex() {
        return Err(ReductaError::UnsupportedDType {
            dtype: self_dtype,
            operation: "logsumexp".to_string(),
            message: "logsumexp is not implemented for complex inputs".to_string(),
        });
    }
    let source = if self_dtype.is_integral(true) {
        cast_op(input, default_float_dtype())?
    } else {
        input.clone()
    };
    let axis_set = resolve_axes(axes, source.rank())?;

    let result = if source.numel() == 0 {
        ln_op(&sum_op(&exp_op(&source)?, axes, keepdim, None)?)?
    } else {
        let maxes = mask_infinite_op(&amax_op(&source, axes, true)?)?;
        let shifted = exp_op(&sub_op(&source, &maxes)?)?;
        let lse = ln_op(&sum_op(&shifted, axes, keepdim, None)?)?;
        let offset = if keepdim {
            maxes
        } else {
            maxes.reshape(&get_reduction_shape(&source.shape(), &axis_set, false))?
        };
        add_op(&lse, &offset)?
    };
    result.set_names(propagate_names_for_reduction(&input.names(), &axis_set, keepdim));
    finish(out, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DType;
    use crate::utils::testing::check_tensor_near;
    use approx::assert_relative_eq;

    #[test]
    fn test_logsumexp_matches_naive() {
        let t = Tensor::new_f64(vec![1.0, 2.0, 3.0, 0.5, -1.0, 4.0], vec![2, 3]).unwrap();
        let naive = |xs: &[f64]| xs.iter().map(|x| x.exp()).sum::<f64>().ln();
        let r = logsumexp_op(&t, &AxisSpec::Single(1), false).unwrap();
        check_tensor_near(&r, &[2], &[naive(&[1.0, 2.0, 3.0]), naive(&[0.5, -1.0, 4.0])], 1e-12);
        let kept = logsumexp_op(&t, &AxisSpec::Single(0), true).unwrap();
        assert_eq!(kept.shape(), vec![1, 3]);
    }

    #[test]
    fn test_logsumexp_is_stable_for_large_inputs() {
        let t = Tensor::new_f64(vec![1000.0, 1000.0], vec![2]).unwrap();
        let r = logsumexp_op(&t, &AxisSpec::All, false).unwrap();
        assert_relative_eq!(r.item::<f64>().unwrap(), 1000.0 + 2f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_logsumexp_infinities() {
        let t = Tensor::new_f64(vec![f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, 0.0], vec![2, 2]).unwrap();
        let r = logsumexp_op(&t, &AxisSpec::Single(1), false).unwrap().to_vec::<f64>().unwrap();
        assert_eq!(r[0], f64::NEG_INFINITY);
        assert_eq!(r[1], f64::INFINITY);
    }

    #[test]
    fn test_logsumexp_empty_is_negative_infinity() {
        let t = Tensor::new(vec![], vec![0]).unwrap();
        let r = logsumexp_op(&t, &AxisSpec::All, false).unwrap();
        assert_eq!(r.item::<f32>().unwrap(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_integral_input_is_promoted() {
        let t = Tensor::new_i64(vec![0, 0], vec![2]).unwrap();
        let r = logsumexp_op(&t, &AxisSpec::All, false).unwrap();
        assert_eq!(r.dtype(), default_float_dtype());
        assert_relative_eq!(r.item::<f64>().unwrap(), 2f64.ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_out_must_be_floating() {
        let t = Tensor::new(vec![1.0], vec![1]).unwrap();
        let bad = Tensor::new_i64(vec![0], vec![1]).unwrap();
        assert!(logsumexp_out(&t, &AxisSpec::All, false, &bad).is_err());
        let out = Tensor::new_f64(vec![], vec![0]).unwrap();
        logsumexp_out(&t, &AxisSpec::All, false, &out).unwrap();
        assert_eq!(out.dtype(), DType::F64);
        assert_relative_eq!(out.item::<f64>().unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_logsumexp_named_keeps_other_names() {
        let t = Tensor::new(vec![0.0; 6], vec![2, 3])
            .unwrap()
            .with_names(&[Some("batch"), Some("class")])
            .unwrap();
        let r = logsumexp_named(&t, &["class"], false).unwrap();
        assert_eq!(r.names(), Some(vec![Some("batch".to_string())]));
        check_tensor_near(&r, &[2], &[3f64.ln(), 3f64.ln()], 1e-6);
    }
}
