//! Finite differences along an axis: `diff` and the numerical `gradient`.

pub mod diff;
pub mod gradient;

pub use diff::{diff_op, diff_out};
pub use gradient::{gradient_op, Spacing};

use crate::error::ReductaError;
use crate::ops::kernels::{lane, scatter_lanes};
use crate::ops::reduction::plan::LaneGeometry;
use crate::ops::traits::Element;
use crate::tensor::utils::lane_geometry;
use crate::tensor::Tensor;

pub(crate) fn geometry_along(shape: &[usize], dim: usize) -> LaneGeometry {
    let (outer, len, inner) = lane_geometry(shape, dim);
    LaneGeometry { outer, len, inner }
}

/// Reads `t` as lanes along `dim`, one `Vec` per lane.
pub(crate) fn lanes_of<T: Element>(t: &Tensor, dim: usize) -> Result<Vec<Vec<T>>, ReductaError> {
    let data = t.to_vec::<T>()?;
    let geometry = geometry_along(&t.shape(), dim);
    Ok((0..geometry.lanes())
        .map(|l| lane(&data, &geometry, l).into_owned())
        .collect())
}

/// Builds a tensor of `shape` from lanes along `dim`, each of length `shape[dim]`.
pub(crate) fn from_lanes<T: Element>(per_lane: Vec<Vec<T>>, shape: Vec<usize>, dim: usize) -> Result<Tensor, ReductaError> {
    let geometry = geometry_along(&shape, dim);
    Tensor::from_vec(scatter_lanes(per_lane, geometry), shape)
}
