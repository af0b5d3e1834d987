//! Backward formulas for the scans and value-selecting reductions, the
//! `BackwardOp` node trait and a finite-difference gradient checker.

pub mod backward;
pub mod backward_op;
pub mod grad_check;
pub mod grad_mode;

pub use backward::{cummaxmin_backward, cumprod_backward, value_selecting_reduction_backward};
pub use backward_op::BackwardOp;
pub use grad_mode::{is_create_graph_enabled, CreateGraphGuard};
