use num_complex::Complex;
use num_traits::Float;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use crate::buffer::CpuBuffer;
use crate::types::DType;

/// A scalar type that can live in a tensor buffer.
///
/// Arithmetic goes through the `acc_*` methods so that every element type,
/// `bool` included, can be summed, multiplied and differenced by the same
/// generic kernels. Integer arithmetic wraps. For `bool`, add is `or`,
/// mul is `and` and sub is `xor`.
pub trait Element: Copy + Debug + PartialEq + Send + Sync + 'static {
    const DTYPE: DType;
    const ZERO: Self;
    const ONE: Self;
    /// True for `bool` and the integer types.
    const IS_INTEGRAL: bool;

    fn acc_add(self, rhs: Self) -> Self;
    fn acc_sub(self, rhs: Self) -> Self;
    fn acc_mul(self, rhs: Self) -> Self;

    /// NaN test; a complex value is NaN if either part is.
    fn is_nan_value(self) -> bool;
    /// Truth value of the element (non-zero).
    fn is_truthy(self) -> bool;

    fn as_c128(self) -> Complex<f64>;
    fn of_c128(value: Complex<f64>) -> Self;
    fn as_i64(self) -> i64;
    fn of_i64(value: i64) -> Self;

    fn of_f64(value: f64) -> Self {
        Self::of_c128(Complex::new(value, 0.0))
    }

    /// Real part widened to `f64`.
    fn as_f64(self) -> f64 {
        self.as_c128().re
    }

    /// Borrows the matching buffer variant, `None` if the buffer holds another type.
    fn cpu_slice(buffer: &CpuBuffer) -> Option<&[Self]>;
    fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer;
}

/// Element types with a total-ish order (everything but complex).
pub trait RealElement: Element + PartialOrd {}

/// Types supporting true division: real floats and complex numbers.
pub trait FloatLike:
    Element
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The real scalar underneath (`f32` for `Complex<f32>`).
    type Real: Element + Float;

    fn conj(self) -> Self;
    fn abs_f64(self) -> f64;
    fn real_part(self) -> Self::Real;
    fn imag_part(self) -> Self::Real;
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;
}

/// Real floating types: `f32` and `f64`.
pub trait FloatElement: FloatLike + RealElement + Float {}

/// Converts one element into another type.
///
/// Integer to integer conversions go through `i64` so large values survive;
/// everything else goes through `Complex<f64>`.
pub fn cast_element<S: Element, T: Element>(value: S) -> T {
    if S::IS_INTEGRAL && T::IS_INTEGRAL {
        T::of_i64(value.as_i64())
    } else {
        T::of_c128(value.as_c128())
    }
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;
    const ZERO: Self = false;
    const ONE: Self = true;
    const IS_INTEGRAL: bool = true;

    fn acc_add(self, rhs: Self) -> Self {
        self || rhs
    }
    fn acc_sub(self, rhs: Self) -> Self {
        self ^ rhs
    }
    fn acc_mul(self, rhs: Self) -> Self {
        self && rhs
    }
    fn is_nan_value(self) -> bool {
        false
    }
    fn is_truthy(self) -> bool {
        self
    }
    fn as_c128(self) -> Complex<f64> {
        Complex::new(if self { 1.0 } else { 0.0 }, 0.0)
    }
    fn of_c128(value: Complex<f64>) -> Self {
        value.re != 0.0 || value.im != 0.0
    }
    fn as_i64(self) -> i64 {
        self as i64
    }
    fn of_i64(value: i64) -> Self {
        value != 0
    }
    fn cpu_slice(buffer: &CpuBuffer) -> Option<&[Self]> {
        match buffer {
            CpuBuffer::Bool(v) => Some(v.as_slice()),
            _ => None,
        }
    }
    fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
        CpuBuffer::Bool(Arc::new(data))
    }
}

impl RealElement for bool {}

macro_rules! impl_integer_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const IS_INTEGRAL: bool = true;

            fn acc_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            fn acc_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            fn acc_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            fn is_nan_value(self) -> bool {
                false
            }
            fn is_truthy(self) -> bool {
                self != 0
            }
            fn as_c128(self) -> Complex<f64> {
                Complex::new(self as f64, 0.0)
            }
            fn of_c128(value: Complex<f64>) -> Self {
                value.re as $t
            }
            fn as_i64(self) -> i64 {
                self as i64
            }
            fn of_i64(value: i64) -> Self {
                value as $t
            }
            fn cpu_slice(buffer: &CpuBuffer) -> Option<&[Self]> {
                match buffer {
                    CpuBuffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }
            fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
                CpuBuffer::$variant(Arc::new(data))
            }
        }

        impl RealElement for $t {}
    };
}

impl_integer_element!(u8, U8);
impl_integer_element!(i32, I32);
impl_integer_element!(i64, I64);

macro_rules! impl_float_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const IS_INTEGRAL: bool = false;

            fn acc_add(self, rhs: Self) -> Self {
                self + rhs
            }
            fn acc_sub(self, rhs: Self) -> Self {
                self - rhs
            }
            fn acc_mul(self, rhs: Self) -> Self {
                self * rhs
            }
            fn is_nan_value(self) -> bool {
                self.is_nan()
            }
            fn is_truthy(self) -> bool {
                self != 0.0
            }
            fn as_c128(self) -> Complex<f64> {
                Complex::new(self as f64, 0.0)
            }
            fn of_c128(value: Complex<f64>) -> Self {
                value.re as $t
            }
            fn as_i64(self) -> i64 {
                self as i64
            }
            fn of_i64(value: i64) -> Self {
                value as $t
            }
            fn cpu_slice(buffer: &CpuBuffer) -> Option<&[Self]> {
                match buffer {
                    CpuBuffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }
            fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
                CpuBuffer::$variant(Arc::new(data))
            }
        }

        impl RealElement for $t {}

        impl FloatLike for $t {
            type Real = $t;

            fn conj(self) -> Self {
                self
            }
            fn abs_f64(self) -> f64 {
                (self as f64).abs()
            }
            fn real_part(self) -> $t {
                self
            }
            fn imag_part(self) -> $t {
                0.0
            }
            fn from_parts(re: $t, _im: $t) -> Self {
                re
            }
        }

        impl FloatElement for $t {}
    };
}

impl_float_element!(f32, F32);
impl_float_element!(f64, F64);

macro_rules! impl_complex_element {
    ($f:ty, $variant:ident) => {
        impl Element for Complex<$f> {
            const DTYPE: DType = DType::$variant;
            const ZERO: Self = Complex::new(0.0, 0.0);
            const ONE: Self = Complex::new(1.0, 0.0);
            const IS_INTEGRAL: bool = false;

            fn acc_add(self, rhs: Self) -> Self {
                self + rhs
            }
            fn acc_sub(self, rhs: Self) -> Self {
                self - rhs
            }
            fn acc_mul(self, rhs: Self) -> Self {
                self * rhs
            }
            fn is_nan_value(self) -> bool {
                self.re.is_nan() || self.im.is_nan()
            }
            fn is_truthy(self) -> bool {
                self.re != 0.0 || self.im != 0.0
            }
            fn as_c128(self) -> Complex<f64> {
                Complex::new(self.re as f64, self.im as f64)
            }
            fn of_c128(value: Complex<f64>) -> Self {
                Complex::new(value.re as $f, value.im as $f)
            }
            fn as_i64(self) -> i64 {
                self.re as i64
            }
            fn of_i64(value: i64) -> Self {
                Complex::new(value as $f, 0.0)
            }
            fn cpu_slice(buffer: &CpuBuffer) -> Option<&[Self]> {
                match buffer {
                    CpuBuffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }
            fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
                CpuBuffer::$variant(Arc::new(data))
            }
        }

        impl FloatLike for Complex<$f> {
            type Real = $f;

            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }
            fn abs_f64(self) -> f64 {
                (self.re as f64).hypot(self.im as f64)
            }
            fn real_part(self) -> $f {
                self.re
            }
            fn imag_part(self) -> $f {
                self.im
            }
            fn from_parts(re: $f, im: $f) -> Self {
                Complex::new(re, im)
            }
        }
    };
}

impl_complex_element!(f32, Complex64);
impl_complex_element!(f64, Complex128);
