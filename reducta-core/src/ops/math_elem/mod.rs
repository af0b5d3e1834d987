//! Element-wise unary maps used by the composite reductions.
//!
//! Every map keeps the input's shape and names and returns a contiguous tensor.

use num_complex::Complex;

use crate::error::ReductaError;
use crate::ops::traits::{Element, FloatLike};
use crate::tensor::Tensor;

/// Applies `f` to every element of `t`, read as `T`.
pub(crate) fn map_elements<T, R, F>(t: &Tensor, f: F) -> Result<Tensor, ReductaError>
where
    T: Element,
    R: Element,
    F: Fn(T) -> R,
{
    let values = t.to_vec::<T>()?;
    let out = Tensor::from_vec(values.into_iter().map(f).collect(), t.shape())?;
    out.set_names(t.names());
    Ok(out)
}

pub fn exp_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        map_elements(t, |x: T| x.exp())
    }, "exp")
}

pub fn ln_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        map_elements(t, |x: T| x.ln())
    }, "ln")
}

pub fn sqrt_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        map_elements(t, |x: T| x.sqrt())
    }, "sqrt")
}

/// Real part of a floating or complex tensor, in the matching real dtype.
pub fn real_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        map_elements(t, |x: T| x.real_part())
    }, "real")
}

/// Imaginary part; zeros for real inputs.
pub fn imag_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float_like!(t.dtype(), T => {
        map_elements(t, |x: T| x.imag_part())
    }, "imag")
}

/// Builds a complex tensor from equally shaped real and imaginary parts.
///
/// # Errors
/// `TypeMismatch` if the parts differ in dtype, `ShapeMismatch` if they differ in shape.
pub fn complex_op(re: &Tensor, im: &Tensor) -> Result<Tensor, ReductaError> {
    if re.dtype() != im.dtype() {
        return Err(ReductaError::TypeMismatch {
            expected: re.dtype(),
            actual: im.dtype(),
            operation: "complex".to_string(),
        });
    }
    if re.shape() != im.shape() {
        return Err(ReductaError::ShapeMismatch {
            expected: re.shape(),
            actual: im.shape(),
            operation: "complex".to_string(),
        });
    }
    dispatch_float!(re.dtype(), T => {
        let real: Vec<T> = re.to_vec()?;
        let imag: Vec<T> = im.to_vec()?;
        let values: Vec<Complex<T>> = real.into_iter().zip(imag).map(|(r, i)| Complex::new(r, i)).collect();
        let out = Tensor::from_vec(values, re.shape())?;
        out.set_names(re.names());
        Ok(out)
    }, "complex")
}

/// `true` where the element is NaN. Always `false` for integral dtypes.
pub fn isnan_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_dtype!(t.dtype(), T => {
        map_elements(t, |x: T| x.is_nan_value())
    })
}

/// `true` where the element is non-zero.
pub fn ne_zero_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_dtype!(t.dtype(), T => {
        map_elements(t, |x: T| x.is_truthy())
    })
}

/// Replaces `+inf` and `-inf` by zero.
pub fn mask_infinite_op(t: &Tensor) -> Result<Tensor, ReductaError> {
    dispatch_float!(t.dtype(), T => {
        map_elements(t, |x: T| if x.is_infinite() { 0.0 } else { x })
    }, "mask_infinite")
}
