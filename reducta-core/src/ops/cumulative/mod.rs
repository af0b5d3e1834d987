//! Running operators along one axis: every output keeps the input shape and names.

pub mod cummax;
pub mod cumsum;
pub mod logcumsumexp;

pub use cummax::{cummax_named, cummax_op, cummax_out, cummin_named, cummin_op, cummin_out};
pub use cumsum::{
    cumprod_named, cumprod_op, cumprod_out, cumsum_named, cumsum_op, cumsum_out,
};
pub use logcumsumexp::{logcumsumexp_named, logcumsumexp_op, logcumsumexp_out};

use crate::error::ReductaError;
use crate::ops::reduction::axes::wrap_dim;
use crate::ops::reduction::dispatch::{KernelArgs, OpKind};
use crate::ops::reduction::plan::{build_scan_plan, OutputSpec};
use crate::tensor::Tensor;
use crate::types::DType;

/// Wraps `dim`, builds the scan plan and runs it.
pub(crate) fn run_scan(
    op: OpKind,
    input: &Tensor,
    dim: isize,
    compute_dtype: DType,
    explicit: Option<DType>,
    outputs: &[OutputSpec<'_>],
) -> Result<Vec<Tensor>, ReductaError> {
    let d = wrap_dim(dim, input.rank())?;
    build_scan_plan(op, input, d, compute_dtype, explicit, outputs)?.run(&KernelArgs::default())
}

pub(crate) fn single_output(op: OpKind, mut outputs: Vec<Tensor>) -> Result<Tensor, ReductaError> {
    outputs.pop().ok_or_else(|| ReductaError::UndefinedOutput {
        operation: op.name().to_string(),
    })
}
