/// Defines the possible data types for Tensor elements.
///
/// This enum allows the runtime to handle tensors with different
/// numerical types dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean type (true/false values).
    Bool,
    /// 8-bit unsigned integer. Kept for byte-mask compatibility in `all`/`any`.
    U8,
    /// 32-bit integer type.
    I32,
    /// 64-bit integer type, the large-integer type reductions promote to.
    I64,
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
    /// Complex number made of two `f32`.
    Complex64,
    /// Complex number made of two `f64`.
    Complex128,
}

impl DType {
    /// Returns true for integer types, and for `Bool` when `include_bool` is set.
    pub fn is_integral(self, include_bool: bool) -> bool {
        match self {
            DType::Bool => include_bool,
            DType::U8 | DType::I32 | DType::I64 => true,
            _ => false,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// The real-valued counterpart of a complex type; other types map to themselves.
    pub fn to_real_value_type(self) -> DType {
        match self {
            DType::Complex64 => DType::F32,
            DType::Complex128 => DType::F64,
            other => other,
        }
    }

    /// Size in bytes of one element.
    pub fn size_of(self) -> usize {
        match self {
            DType::Bool | DType::U8 => 1,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 | DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }
}
