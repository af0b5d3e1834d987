//! Axis specifications and their resolution against a tensor rank.

use crate::error::ReductaError;

/// Which axes an operator reduces over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AxisSpec {
    /// Reduce every axis.
    #[default]
    All,
    /// One signed axis, negative values count from the end.
    Single(isize),
    /// Signed axes. An empty list reduces every axis.
    List(Vec<isize>),
}

impl From<isize> for AxisSpec {
    fn from(axis: isize) -> Self {
        AxisSpec::Single(axis)
    }
}

impl From<Vec<isize>> for AxisSpec {
    fn from(axes: Vec<isize>) -> Self {
        AxisSpec::List(axes)
    }
}

impl From<&[isize]> for AxisSpec {
    fn from(axes: &[isize]) -> Self {
        AxisSpec::List(axes.to_vec())
    }
}

impl From<Option<isize>> for AxisSpec {
    fn from(axis: Option<isize>) -> Self {
        axis.map_or(AxisSpec::All, AxisSpec::Single)
    }
}

/// Largest rank an [`AxisSet`] can describe.
pub const MAX_RANK: usize = 64;

/// Set of resolved axes stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisSet(u64);

impl AxisSet {
    /// All axes of a tensor of rank `rank`.
    pub fn full(rank: usize) -> Self {
        if rank >= MAX_RANK {
            AxisSet(u64::MAX)
        } else {
            AxisSet((1u64 << rank) - 1)
        }
    }

    /// Builds a set from already-wrapped axes.
    pub fn from_axes(axes: &[usize]) -> Self {
        AxisSet(axes.iter().fold(0u64, |mask, &a| mask | (1u64 << a)))
    }

    pub fn contains(&self, axis: usize) -> bool {
        axis < MAX_RANK && self.0 & (1u64 << axis) != 0
    }

    pub fn insert(&mut self, axis: usize) {
        self.0 |= 1u64 << axis;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Reduced axes in increasing order, limited to `rank`.
    pub fn to_vec(&self, rank: usize) -> Vec<usize> {
        (0..rank).filter(|&a| self.contains(a)).collect()
    }
}

/// Wraps a signed axis into `[0, rank)`.
///
/// A rank-0 tensor is treated as rank 1 for wrapping, so it accepts `0` and `-1`.
pub fn wrap_dim(dim: isize, rank: usize) -> Result<usize, ReductaError> {
    let effective = rank.max(1) as isize;
    let wrapped = if dim < 0 { dim + effective } else { dim };
    if wrapped < 0 || wrapped >= effective {
        return Err(ReductaError::InvalidAxis { axis: dim, rank });
    }
    Ok(wrapped as usize)
}

/// Resolves `spec` against `rank`: wraps negative axes and drops duplicates.
///
/// `All` and an empty list both give every axis. On a rank-0 tensor any valid
/// axis resolves to the empty set.
pub fn resolve_axes(spec: &AxisSpec, rank: usize) -> Result<AxisSet, ReductaError> {
    if rank > MAX_RANK {
        return Err(ReductaError::InvalidArgument {
            operation: "resolve_axes".to_string(),
            message: format!("tensors of rank {} exceed the supported {}", rank, MAX_RANK),
        });
    }
    let axes: &[isize] = match spec {
        AxisSpec::All => return Ok(AxisSet::full(rank)),
        AxisSpec::List(list) if list.is_empty() => return Ok(AxisSet::full(rank)),
        AxisSpec::Single(axis) => std::slice::from_ref(axis),
        AxisSpec::List(list) => list.as_slice(),
    };
    let mut set = AxisSet::default();
    for &axis in axes {
        let wrapped = wrap_dim(axis, rank)?;
        if rank > 0 {
            set.insert(wrapped);
        }
    }
    Ok(set)
}
