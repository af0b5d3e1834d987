//! Iteration plans: output allocation, fast paths and lane layout.
//!
//! The builder validates every output before touching it, resizes (or
//! allocates) the outputs, propagates names and then either finishes the call
//! itself (rank-0 copy, zero-element identity fill) or hands a plan to a
//! kernel. Kernels see the input as `[outer, len, inner]` lanes in the compute
//! dtype.

use std::sync::Arc;

use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::named::{propagate_names_for_reduction, DimNames};
use crate::ops::reduction::axes::AxisSet;
use crate::ops::reduction::dispatch::{dispatch, KernelArgs, OpKind};
use crate::ops::reduction::resolve::get_reduction_shape;
use crate::ops::traits::{cast_element, Element};
use crate::tensor::create;
use crate::tensor::utils::{calculate_strides, lane_geometry};
use crate::tensor::Tensor;
use crate::types::DType;

/// A caller-supplied output, or none.
#[derive(Debug, Clone, Copy)]
pub enum OutputBuffer<'a> {
    /// The operator allocates its result.
    NoOutput,
    /// The operator validates, resizes and fills this tensor in place.
    Existing(&'a Tensor),
}

impl<'a> OutputBuffer<'a> {
    pub fn dtype(&self) -> Option<DType> {
        match self {
            OutputBuffer::NoOutput => None,
            OutputBuffer::Existing(t) => Some(t.dtype()),
        }
    }

    pub fn tensor(&self) -> Option<&'a Tensor> {
        match *self {
            OutputBuffer::NoOutput => None,
            OutputBuffer::Existing(t) => Some(t),
        }
    }
}

impl<'a> From<Option<&'a Tensor>> for OutputBuffer<'a> {
    fn from(out: Option<&'a Tensor>) -> Self {
        out.map_or(OutputBuffer::NoOutput, OutputBuffer::Existing)
    }
}

/// One output slot of a plan and the dtype it must end up with.
#[derive(Debug, Clone, Copy)]
pub struct OutputSpec<'a> {
    pub buffer: OutputBuffer<'a>,
    pub dtype: DType,
}

impl<'a> OutputSpec<'a> {
    pub fn new(buffer: OutputBuffer<'a>, dtype: DType) -> Self {
        OutputSpec { buffer, dtype }
    }
}

/// Input layout as seen by a kernel: `outer * inner` lanes of `len` elements.
/// Element `k` of lane `l` sits at `(l / inner) * len * inner + k * inner + l % inner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneGeometry {
    pub outer: usize,
    pub len: usize,
    pub inner: usize,
}

impl LaneGeometry {
    pub fn lanes(&self) -> usize {
        self.outer * self.inner
    }

    pub fn index(&self, lane: usize, k: usize) -> usize {
        (lane / self.inner) * self.len * self.inner + k * self.inner + lane % self.inner
    }
}

/// Everything a kernel needs for one call.
#[derive(Debug)]
pub struct IterationPlan {
    pub(crate) op: OpKind,
    /// Input view whose logical order matches `geometry`.
    pub(crate) input: Tensor,
    pub(crate) device: StorageDevice,
    pub(crate) compute_dtype: DType,
    pub(crate) geometry: LaneGeometry,
    pub(crate) outputs: Vec<Tensor>,
}

impl IterationPlan {
    /// The input in lane order, converted to the compute dtype.
    pub fn input_as<T: Element>(&self) -> Result<Vec<T>, ReductaError> {
        self.input.read_data().values_as::<T>()
    }

    /// Fills output `index` with `values`, converting them to the output dtype.
    pub fn write_output<T: Element>(&self, index: usize, values: Vec<T>) -> Result<(), ReductaError> {
        let target = self.outputs.get(index).ok_or_else(|| ReductaError::UndefinedOutput {
            operation: format!("{} (output #{})", self.op.name(), index),
        })?;
        assign_values(target, values)
    }

    pub fn geometry(&self) -> LaneGeometry {
        self.geometry
    }

    pub fn outputs(&self) -> &[Tensor] {
        &self.outputs
    }

    /// Looks up the kernel for this plan and runs it.
    pub fn execute(mut self, args: &KernelArgs) -> Result<Vec<Tensor>, ReductaError> {
        let kernel = dispatch(self.op, self.device)?;
        kernel(&mut self, args)?;
        Ok(self.outputs)
    }
}

/// Result of the builder: either the call is already complete, or a kernel must run.
#[derive(Debug)]
pub enum PlanOutcome {
    Finished(Vec<Tensor>),
    Pending(IterationPlan),
}

impl PlanOutcome {
    pub fn run(self, args: &KernelArgs) -> Result<Vec<Tensor>, ReductaError> {
        match self {
            PlanOutcome::Finished(outputs) => Ok(outputs),
            PlanOutcome::Pending(plan) => plan.execute(args),
        }
    }
}

/// Replaces the contents of `target` with `values` converted to its dtype.
pub(crate) fn assign_values<T: Element>(target: &Tensor, values: Vec<T>) -> Result<(), ReductaError> {
    let mut guard = target.write_data();
    if values.len() != guard.numel() {
        return Err(ReductaError::InternalError(format!(
            "kernel produced {} values for an output of shape {:?}",
            values.len(),
            guard.shape
        )));
    }
    let buffer = dispatch_dtype!(guard.dtype, U => {
        Buffer::from_vec(values.into_iter().map(cast_element::<T, U>).collect::<Vec<U>>())
    });
    guard.buffer = Arc::new(buffer);
    guard.offset = 0;
    guard.strides = calculate_strides(&guard.shape);
    Ok(())
}

/// Fills `target` with `value` converted to its dtype.
pub(crate) fn fill_value(target: &Tensor, value: f64) -> Result<(), ReductaError> {
    let numel = target.numel();
    assign_values(target, vec![value; numel])
}

/// Gives `target` a fresh zeroed buffer of `shape`, keeping its dtype.
fn resize_output(target: &Tensor, shape: &[usize], names: DimNames) -> Result<(), ReductaError> {
    let fresh = create::empty(shape, target.dtype(), target.device())?;
    let fresh_data = fresh.read_data();
    let mut guard = target.write_data();
    guard.buffer = Arc::clone(&fresh_data.buffer);
    guard.shape = shape.to_vec();
    guard.strides = calculate_strides(shape);
    guard.offset = 0;
    guard.names = names;
    Ok(())
}

/// Checks existing outputs against an explicit dtype and the input device.
fn validate_outputs(
    op: OpKind,
    device: StorageDevice,
    explicit: Option<DType>,
    outputs: &[OutputSpec<'_>],
) -> Result<(), ReductaError> {
    for spec in outputs {
        if let OutputBuffer::Existing(out) = spec.buffer {
            let out_dtype = out.dtype();
            if let Some(requested) = explicit {
                if out_dtype != requested {
                    return Err(ReductaError::TypeMismatch {
                        expected: requested,
                        actual: out_dtype,
                        operation: format!(
                            "{}: expected out tensor to have dtype {:?}, but got {:?} instead",
                            op.name(),
                            requested,
                            out_dtype
                        ),
                    });
                }
            }
            if out_dtype != spec.dtype {
                return Err(ReductaError::TypeMismatch {
                    expected: spec.dtype,
                    actual: out_dtype,
                    operation: op.name().to_string(),
                });
            }
            if out.device() != device {
                return Err(ReductaError::DeviceMismatch {
                    expected: device,
                    actual: out.device(),
                    operation: op.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Allocates or resizes every output and returns the handles.
fn prepare_outputs(
    device: StorageDevice,
    shape: &[usize],
    names: &DimNames,
    outputs: &[OutputSpec<'_>],
) -> Result<Vec<Tensor>, ReductaError> {
    outputs
        .iter()
        .map(|spec| match spec.buffer {
            OutputBuffer::Existing(out) => {
                resize_output(out, shape, names.clone())?;
                Ok(out.clone())
            }
            OutputBuffer::NoOutput => {
                let fresh = create::empty(shape, spec.dtype, device)?;
                fresh.write_data().names = names.clone();
                Ok(fresh)
            }
        })
        .collect()
}

/// Fast paths shared by reductions and scans. Returns the finished outputs
/// when no kernel has to run.
fn try_fast_path(
    op: OpKind,
    input: &Tensor,
    outputs: &[Tensor],
) -> Result<Option<Vec<Tensor>>, ReductaError> {
    let (device, rank, numel, dtype) = {
        let guard = input.read_data();
        (guard.device, guard.rank(), guard.numel(), guard.dtype)
    };
    if device != StorageDevice::CPU {
        return Ok(None);
    }
    if rank == 0 && op.copies_scalar() {
        log::trace!("{}: rank-0 input, copying through", op.name());
        dispatch_dtype!(dtype, T => {
            assign_values(&outputs[0], input.read_data().gather::<T>()?)?;
        });
        return Ok(Some(outputs.to_vec()));
    }
    if numel == 0 {
        log::trace!("{}: zero-element input, filling identity", op.name());
        if let Some(identity) = op.identity() {
            for out in outputs {
                fill_value(out, identity)?;
            }
        }
        return Ok(Some(outputs.to_vec()));
    }
    Ok(None)
}

/// Builds the plan for reducing `axes` of `input`.
///
/// # Errors
/// * `TypeMismatch` if an existing output conflicts with `explicit` or with its slot dtype.
/// * `EmptyReduction` if `op` has no identity and a reduced axis has size 0.
pub fn build_plan<'a>(
    op: OpKind,
    input: &Tensor,
    axes: &AxisSet,
    keepdim: bool,
    compute_dtype: DType,
    explicit: Option<DType>,
    outputs: &[OutputSpec<'a>],
) -> Result<PlanOutcome, ReductaError> {
    // Snapshot first: an output may alias the input and is about to be resized.
    let input = &input.detach();
    let (shape, names, device) = {
        let guard = input.read_data();
        (guard.shape.clone(), guard.names.clone(), guard.device)
    };
    validate_outputs(op, device, explicit, outputs)?;

    if op.identity().is_none() {
        if let Some(axis) = (0..shape.len()).find(|&a| axes.contains(a) && shape[a] == 0) {
            return Err(ReductaError::EmptyReduction {
                operation: op.name().to_string(),
                message: format!(
                    "expected reduction dim {} to have non-zero size (shape {:?}); reduction over zero-size dimension has no identity",
                    axis, shape
                ),
            });
        }
    }

    let out_shape = get_reduction_shape(&shape, axes, keepdim);
    let out_names = propagate_names_for_reduction(&names, axes, keepdim);
    let prepared = prepare_outputs(device, &out_shape, &out_names, outputs)?;

    if let Some(done) = try_fast_path(op, input, &prepared)? {
        return Ok(PlanOutcome::Finished(done));
    }

    let rank = shape.len();
    let kept: Vec<usize> = (0..rank).filter(|&a| !axes.contains(a)).collect();
    let reduced: Vec<usize> = (0..rank).filter(|&a| axes.contains(a)).collect();
    let outer = kept.iter().map(|&a| shape[a]).product();
    let len = reduced.iter().map(|&a| shape[a]).product();
    let order: Vec<usize> = kept.into_iter().chain(reduced).collect();
    let arranged = input.permute(&order)?;

    Ok(PlanOutcome::Pending(IterationPlan {
        op,
        input: arranged,
        device,
        compute_dtype,
        geometry: LaneGeometry { outer, len, inner: 1 },
        outputs: prepared,
    }))
}

/// Builds the plan for a running operator along `dim` (already wrapped).
/// Every output has the input's shape and names.
pub fn build_scan_plan<'a>(
    op: OpKind,
    input: &Tensor,
    dim: usize,
    compute_dtype: DType,
    explicit: Option<DType>,
    outputs: &[OutputSpec<'a>],
) -> Result<PlanOutcome, ReductaError> {
    // Snapshot first: an output may alias the input and is about to be resized.
    let input = &input.detach();
    let (shape, names, device) = {
        let guard = input.read_data();
        (guard.shape.clone(), guard.names.clone(), guard.device)
    };
    validate_outputs(op, device, explicit, outputs)?;
    let prepared = prepare_outputs(device, &shape, &names, outputs)?;

    if let Some(done) = try_fast_path(op, input, &prepared)? {
        return Ok(PlanOutcome::Finished(done));
    }

    let (outer, len, inner) = lane_geometry(&shape, dim);
    Ok(PlanOutcome::Pending(IterationPlan {
        op,
        input: input.detach(),
        device,
        compute_dtype,
        geometry: LaneGeometry { outer, len, inner },
        outputs: prepared,
    }))
}

/// Copies `result` into a caller-supplied `out`, resizing it and keeping its dtype.
///
/// Used by composite operators that compute into a fresh tensor first.
pub(crate) fn copy_into_output(out: &Tensor, result: &Tensor) -> Result<Tensor, ReductaError> {
    let (shape, names, dtype) = {
        let guard = result.read_data();
        (guard.shape.clone(), guard.names.clone(), guard.dtype)
    };
    resize_output(out, &shape, names)?;
    dispatch_dtype!(dtype, T => {
        assign_values(out, result.to_vec::<T>()?)?;
    });
    Ok(out.clone())
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
