use crate::error::ReductaError;
use crate::ops::comparison::equal_op;
use crate::ops::reduction::all_any::{all_op, any_op};
use crate::ops::reduction::argmax::{argmax_op, argmin_op};
use crate::ops::reduction::axes::AxisSpec;
use crate::ops::reduction::logsumexp::logsumexp_op;
use crate::ops::reduction::max::{amax_op, amin_op, max_dim, min_dim};
use crate::ops::reduction::mean::mean_op;
use crate::ops::reduction::norm::norm_op;
use crate::ops::reduction::prod::prod_op;
use crate::ops::reduction::sum::sum_op;
use crate::ops::reduction::trace::trace_op;
use crate::ops::reduction::var::{std_op, var_op};
use crate::tensor::Tensor;

/// Method forms of the reductions, with the dtype left to inference.
impl Tensor {
    /// Delegates to [`sum_op`].
    pub fn sum(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        sum_op(self, axes, keepdim, None)
    }

    /// Delegates to [`mean_op`].
    pub fn mean(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        mean_op(self, axes, keepdim, None)
    }

    pub fn prod(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        prod_op(self, axes, keepdim, None)
    }

    pub fn all(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        all_op(self, axes, keepdim)
    }

    pub fn any(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        any_op(self, axes, keepdim)
    }

    pub fn amax(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        amax_op(self, axes, keepdim)
    }

    pub fn amin(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        amin_op(self, axes, keepdim)
    }

    /// Largest value along `dim` and its `I64` index.
    pub fn max_dim(&self, dim: isize, keepdim: bool) -> Result<(Tensor, Tensor), ReductaError> {
        max_dim(self, dim, keepdim)
    }

    pub fn min_dim(&self, dim: isize, keepdim: bool) -> Result<(Tensor, Tensor), ReductaError> {
        min_dim(self, dim, keepdim)
    }

    pub fn argmax(&self, dim: Option<isize>, keepdim: bool) -> Result<Tensor, ReductaError> {
        argmax_op(self, dim, keepdim)
    }

    pub fn argmin(&self, dim: Option<isize>, keepdim: bool) -> Result<Tensor, ReductaError> {
        argmin_op(self, dim, keepdim)
    }

    pub fn norm(&self, p: f64, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        norm_op(self, p, axes, keepdim, None)
    }

    pub fn logsumexp(&self, axes: &AxisSpec, keepdim: bool) -> Result<Tensor, ReductaError> {
        logsumexp_op(self, axes, keepdim)
    }

    /// Variance with `correction` (1 when `None`).
    pub fn var(&self, axes: &AxisSpec, correction: Option<i64>, keepdim: bool) -> Result<Tensor, ReductaError> {
        var_op(self, axes, correction, keepdim)
    }

    pub fn std(&self, axes: &AxisSpec, correction: Option<i64>, keepdim: bool) -> Result<Tensor, ReductaError> {
        std_op(self, axes, correction, keepdim)
    }

    pub fn trace(&self) -> Result<Tensor, ReductaError> {
        trace_op(self)
    }

    /// Same names, shape and elements; see [`equal_op`].
    pub fn equal(&self, other: &Tensor) -> Result<bool, ReductaError> {
        equal_op(self, other)
    }
}
