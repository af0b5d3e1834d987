use crate::error::ReductaError;
use crate::named::dimnames_to_positions;
use crate::ops::reduction::axes::AxisSpec;
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{OutputBuffer, OutputSpec};
use crate::ops::reduction::reduce_single;
use crate::ops::reduction::resolve::resolve_dtype;
use crate::tensor::Tensor;
use crate::types::DType;

/// Product over `axes`. Integral inputs accumulate in `I64`; the product of
/// zero elements is 1.
pub fn prod_op(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    prod_impl(input, axes, keepdim, dtype, OutputBuffer::NoOutput)
}

pub fn prod_out(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: &Tensor,
) -> Result<Tensor, ReductaError> {
    prod_impl(input, axes, keepdim, dtype, OutputBuffer::Existing(out))
}

pub fn prod_named(
    input: &Tensor,
    names: &[&str],
    keepdim: bool,
    dtype: Option<DType>,
) -> Result<Tensor, ReductaError> {
    let axes = dimnames_to_positions(input, names)?;
    prod_op(input, &AxisSpec::List(axes), keepdim, dtype)
}

fn prod_impl(
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    dtype: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<Tensor, ReductaError> {
    let compute = resolve_dtype(input.dtype(), dtype, out.dtype(), true);
    reduce_single(
        OpKind::Prod,
        input,
        axes,
        keepdim,
        compute,
        dtype,
        OutputSpec::new(out, compute),
        &KernelArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::check_tensor_near;
    use num_complex::Complex;

    #[test]
    fn test_prod_rows_and_columns() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        check_tensor_near(&prod_op(&t, &AxisSpec::Single(0), false, None).unwrap(), &[3], &[4.0, 10.0, 18.0], 1e-6);
        check_tensor_near(&prod_op(&t, &AxisSpec::Single(1), true, None).unwrap(), &[2, 1], &[6.0, 120.0], 1e-6);
        check_tensor_near(&prod_op(&t, &AxisSpec::All, false, None).unwrap(), &[], &[720.0], 1e-3);
    }

    #[test]
    fn test_prod_identity_and_promotion() {
        let empty = Tensor::new_i32(vec![], vec![2, 0]).unwrap();
        let p = prod_op(&empty, &AxisSpec::Single(1), false, None).unwrap();
        assert_eq!(p.dtype(), DType::I64);
        assert_eq!(p.to_vec::<i64>().unwrap(), vec![1, 1]);

        let b = Tensor::new_bool(vec![true, true, false], vec![3]).unwrap();
        assert_eq!(prod_op(&b, &AxisSpec::All, false, None).unwrap().item::<i64>().unwrap(), 0);
    }

    #[test]
    fn test_complex_prod() {
        let t = Tensor::new_complex128(vec![Complex::new(0.0, 1.0), Complex::new(0.0, 1.0)], vec![2]).unwrap();
        let p = prod_op(&t, &AxisSpec::All, false, None).unwrap();
        assert_eq!(p.item::<Complex<f64>>().unwrap(), Complex::new(-1.0, 0.0));
    }

    #[test]
    fn test_prod_out_and_named() {
        let t = Tensor::new_f64(vec![2.0, 3.0, 4.0, 5.0], vec![2, 2])
            .unwrap()
            .with_names(&[Some("a"), Some("b")])
            .unwrap();
        let out = Tensor::new_f64(vec![], vec![0]).unwrap();
        prod_out(&t, &AxisSpec::Single(0), false, None, &out).unwrap();
        check_tensor_near(&out, &[2], &[8.0, 15.0], 1e-12);
        let named = prod_named(&t, &["b"], false, None).unwrap();
        check_tensor_near(&named, &[2], &[6.0, 20.0], 1e-12);
        assert_eq!(named.names(), Some(vec![Some("a".to_string())]));
    }
}
