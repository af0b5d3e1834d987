//! Dtype dispatch macros.
//!
//! Each macro matches a runtime [`DType`](crate::types::DType), binds the
//! concrete element type to `$T` and evaluates `$body` with it. Dtypes outside
//! the macro's family make the enclosing function return
//! `ReductaError::UnsupportedDType` naming `$op`.

/// Every element type.
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::types::DType::Bool => {
                type $T = bool;
                $body
            }
            $crate::types::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::types::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::types::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::types::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::types::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::types::DType::Complex64 => {
                type $T = num_complex::Complex<f32>;
                $body
            }
            $crate::types::DType::Complex128 => {
                type $T = num_complex::Complex<f64>;
                $body
            }
        }
    };
}

/// Ordered element types: bool, integers and real floats.
macro_rules! dispatch_real {
    ($dtype:expr, $T:ident => $body:block, $op:expr) => {
        match $dtype {
            $crate::types::DType::Bool => {
                type $T = bool;
                $body
            }
            $crate::types::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::types::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::types::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::types::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::types::DType::F64 => {
                type $T = f64;
                $body
            }
            other => {
                return Err($crate::error::ReductaError::UnsupportedDType {
                    dtype: other,
                    operation: ($op).to_string(),
                    message: "complex values have no ordering".to_string(),
                })
            }
        }
    };
}

/// Real floating types.
macro_rules! dispatch_float {
    ($dtype:expr, $T:ident => $body:block, $op:expr) => {
        match $dtype {
            $crate::types::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::types::DType::F64 => {
                type $T = f64;
                $body
            }
            other => {
                return Err($crate::error::ReductaError::UnsupportedDType {
                    dtype: other,
                    operation: ($op).to_string(),
                    message: "expected a floating point dtype".to_string(),
                })
            }
        }
    };
}

/// Real floating and complex types.
macro_rules! dispatch_float_like {
    ($dtype:expr, $T:ident => $body:block, $op:expr) => {
        match $dtype {
            $crate::types::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::types::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::types::DType::Complex64 => {
                type $T = num_complex::Complex<f32>;
                $body
            }
            $crate::types::DType::Complex128 => {
                type $T = num_complex::Complex<f64>;
                $body
            }
            other => {
                return Err($crate::error::ReductaError::UnsupportedDType {
                    dtype: other,
                    operation: ($op).to_string(),
                    message: "expected a floating point or complex dtype".to_string(),
                })
            }
        }
    };
}
