//! Reductions: axis resolution, dtype/shape inference, plan building, kernel
//! dispatch and the operators built on top of them.

pub mod all_any;
pub mod argmax;
pub mod axes;
pub mod dispatch;
pub mod logsumexp;
pub mod max;
pub mod mean;
pub mod norm;
pub mod plan;
pub mod prod;
pub mod resolve;
pub mod sum;
pub mod trace;
pub mod var;

pub use axes::{resolve_axes, wrap_dim, AxisSet, AxisSpec};
pub use dispatch::{dispatch, KernelArgs, KernelFn, OpKind};
pub use plan::{build_plan, build_scan_plan, IterationPlan, LaneGeometry, OutputBuffer, OutputSpec, PlanOutcome};

use crate::error::ReductaError;
use crate::tensor::Tensor;
use crate::types::DType;

use plan::copy_into_output;

/// Resolves `axes`, builds the plan and runs it for a single-output reduction.
#[allow(clippy::too_many_arguments)]
pub(crate) fn reduce_single(
    op: OpKind,
    input: &Tensor,
    axes: &AxisSpec,
    keepdim: bool,
    compute_dtype: DType,
    explicit: Option<DType>,
    output: OutputSpec<'_>,
    args: &KernelArgs,
) -> Result<Tensor, ReductaError> {
    let axis_set = resolve_axes(axes, input.rank())?;
    build_plan(op, input, &axis_set, keepdim, compute_dtype, explicit, &[output])?
        .run(args)?
        .pop()
        .ok_or_else(|| ReductaError::UndefinedOutput {
            operation: op.name().to_string(),
        })
}

/// Number of input elements folded into each output element.
pub(crate) fn reduced_count(shape: &[usize], axes: &AxisSet) -> usize {
    shape
        .iter()
        .enumerate()
        .filter(|(a, _)| axes.contains(*a))
        .map(|(_, &s)| s)
        .product()
}

/// Rejects an existing output whose dtype differs from an explicitly requested one.
pub(crate) fn check_out_dtype(
    operation: &str,
    explicit: Option<DType>,
    out: OutputBuffer<'_>,
) -> Result<(), ReductaError> {
    if let (Some(requested), Some(actual)) = (explicit, out.dtype()) {
        if requested != actual {
            return Err(ReductaError::TypeMismatch {
                expected: requested,
                actual,
                operation: format!(
                    "{}: expected out tensor to have dtype {:?}, but got {:?} instead",
                    operation, requested, actual
                ),
            });
        }
    }
    Ok(())
}

/// Hands `result` back, or copies it into the caller's output.
pub(crate) fn finish(out: OutputBuffer<'_>, result: Tensor) -> Result<Tensor, ReductaError> {
    match out {
        OutputBuffer::NoOutput => Ok(result),
        OutputBuffer::Existing(target) => copy_into_output(target, &result),
    }
}
