//! Whole-tensor comparison.

pub mod equal;

pub use equal::equal_op;
