//! # Tensor Operations Module (`ops`)
//!
//! Operators are grouped into submodules by what they compute. Each has a core
//! `xxx_op` function; most also come with `xxx_out` (write into a caller
//! tensor) and `xxx_named` (dimension names instead of positions) variants.
//! Operators with a non-trivial gradient attach a
//! [`BackwardOp`](crate::autograd::BackwardOp) to their result when the input
//! requires grad.
//!
//! ## Key Submodules:
//!
//! - [`reduction`]: axis resolution, plan building, kernel dispatch and the
//!   reductions built on them (sum, mean, prod, all/any, amax/amin, argmax,
//!   norm, logsumexp, var/std, trace).
//! - [`cumulative`]: running operators (cumsum, cumprod, logcumsumexp, cummax, cummin).
//! - [`difference`]: `diff` and the finite-difference `gradient`.
//! - [`comparison`]: whole-tensor `equal`.
//! - [`arithmetic`], [`math_elem`], [`dtype`]: element-wise helpers used by
//!   the composite reductions.

pub mod arithmetic;
pub mod comparison;
pub mod cumulative;
pub mod difference;
pub mod dtype;
pub(crate) mod kernels;
pub mod math_elem;
pub mod reduction;
pub mod traits;
