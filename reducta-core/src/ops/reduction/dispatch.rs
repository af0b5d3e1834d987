//! Kernel registry keyed by operation kind and device.
//!
//! One entry per `(OpKind, StorageDevice)`. Dtype branching happens inside
//! each entry. The table is built once on first lookup and never mutated.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::device::StorageDevice;
use crate::error::ReductaError;
use crate::ops::kernels;
use crate::ops::reduction::plan::IterationPlan;

/// Operations that go through the kernel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Sum,
    NanSum,
    Prod,
    And,
    Or,
    MaxValues,
    MinValues,
    AminMax,
    ArgMax,
    ArgMin,
    Norm,
    StdVar,
    CumSum,
    CumProd,
    LogCumSumExp,
    CumMax,
    CumMin,
}

impl OpKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Sum => "sum",
            OpKind::NanSum => "nansum",
            OpKind::Prod => "prod",
            OpKind::And => "all",
            OpKind::Or => "any",
            OpKind::MaxValues => "amax",
            OpKind::MinValues => "amin",
            OpKind::AminMax => "aminmax",
            OpKind::ArgMax => "argmax",
            OpKind::ArgMin => "argmin",
            OpKind::Norm => "norm",
            OpKind::StdVar => "std_var",
            OpKind::CumSum => "cumsum",
            OpKind::CumProd => "cumprod",
            OpKind::LogCumSumExp => "logcumsumexp",
            OpKind::CumMax => "cummax",
            OpKind::CumMin => "cummin",
        }
    }

    /// Value of the reduction over zero elements, `None` when there is none.
    pub fn identity(&self) -> Option<f64> {
        match self {
            OpKind::Sum | OpKind::NanSum | OpKind::Or | OpKind::Norm => Some(0.0),
            OpKind::Prod | OpKind::And => Some(1.0),
            OpKind::StdVar => Some(f64::NAN),
            OpKind::CumSum | OpKind::CumProd | OpKind::LogCumSumExp => Some(0.0),
            OpKind::MaxValues
            | OpKind::MinValues
            | OpKind::AminMax
            | OpKind::ArgMax
            | OpKind::ArgMin
            | OpKind::CumMax
            | OpKind::CumMin => None,
        }
    }

    /// Running operators keep the input shape.
    pub fn is_scan(&self) -> bool {
        matches!(
            self,
            OpKind::CumSum | OpKind::CumProd | OpKind::LogCumSumExp | OpKind::CumMax | OpKind::CumMin
        )
    }

    /// On a single element the result is the element itself (cast to the output dtype).
    pub(crate) fn copies_scalar(&self) -> bool {
        matches!(
            self,
            OpKind::Sum
                | OpKind::Prod
                | OpKind::And
                | OpKind::Or
                | OpKind::MaxValues
                | OpKind::MinValues
                | OpKind::CumSum
                | OpKind::CumProd
                | OpKind::LogCumSumExp
        )
    }
}

/// Extra scalar arguments some kernels take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelArgs {
    /// Norm exponent.
    pub p: f64,
    /// Degrees of freedom subtracted from the element count (var/std).
    pub correction: i64,
    /// Return the standard deviation instead of the variance.
    pub take_sqrt: bool,
}

impl Default for KernelArgs {
    fn default() -> Self {
        KernelArgs {
            p: 2.0,
            correction: 1,
            take_sqrt: false,
        }
    }
}

/// A compute entry point. Writes every output of the plan.
pub type KernelFn = fn(&mut IterationPlan, &KernelArgs) -> Result<(), ReductaError>;

type KernelTable = HashMap<(OpKind, StorageDevice), KernelFn>;

static KERNEL_TABLE: OnceLock<KernelTable> = OnceLock::new();

fn kernel_table() -> &'static KernelTable {
    KERNEL_TABLE.get_or_init(|| {
        let mut table = KernelTable::new();
        kernels::register_cpu_kernels(&mut table);
        log::debug!("kernel table initialised with {} entries", table.len());
        table
    })
}

/// Looks up the kernel for `op` on `device`.
///
/// # Errors
/// `KernelNotRegistered` when no entry exists. This is a build configuration
/// problem and callers must not retry.
pub fn dispatch(op: OpKind, device: StorageDevice) -> Result<KernelFn, ReductaError> {
    kernel_table().get(&(op, device)).copied().ok_or_else(|| {
        log::error!("no {} kernel registered for {:?}", op.name(), device);
        ReductaError::KernelNotRegistered {
            op: op.name().to_string(),
            device,
        }
    })
}

pub fn is_registered(op: OpKind, device: StorageDevice) -> bool {
    kernel_table().contains_key(&(op, device))
}
