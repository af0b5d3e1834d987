use crate::error::ReductaError;
use crate::ops::cumulative::{cummax_op, cummin_op, cumprod_op, cumsum_op, logcumsumexp_op};
use crate::ops::difference::{diff_op, gradient_op, Spacing};
use crate::tensor::Tensor;

impl Tensor {
    pub fn cumsum(&self, dim: isize) -> Result<Tensor, ReductaError> {
        cumsum_op(self, dim, None)
    }

    pub fn cumprod(&self, dim: isize) -> Result<Tensor, ReductaError> {
        cumprod_op(self, dim, None)
    }

    pub fn logcumsumexp(&self, dim: isize) -> Result<Tensor, ReductaError> {
        logcumsumexp_op(self, dim)
    }

    /// Running maximum along `dim` with the `I64` indices it came from.
    pub fn cummax(&self, dim: isize) -> Result<(Tensor, Tensor), ReductaError> {
        cummax_op(self, dim)
    }

    pub fn cummin(&self, dim: isize) -> Result<(Tensor, Tensor), ReductaError> {
        cummin_op(self, dim)
    }

    /// `n`-th forward difference along `dim`.
    pub fn diff(&self, n: usize, dim: isize) -> Result<Tensor, ReductaError> {
        diff_op(self, n, dim, None, None)
    }

    /// Finite-difference derivative along every axis with unit spacing.
    pub fn gradient(&self, edge_order: usize) -> Result<Vec<Tensor>, ReductaError> {
        gradient_op(self, Spacing::Unit, None, edge_order)
    }
}
