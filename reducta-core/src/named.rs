//! Dimension-name bookkeeping for reductions and scans.

use crate::error::ReductaError;
use crate::ops::reduction::axes::AxisSet;
use crate::tensor::Tensor;

pub type DimNames = Option<Vec<Option<String>>>;

/// Names of a reduction output: kept axes keep their name in place, reduced
/// axes are dropped (or left unnamed with `keepdim`).
pub fn propagate_names_for_reduction(names: &DimNames, axes: &AxisSet, keepdim: bool) -> DimNames {
    let names = names.as_ref()?;
    let out: Vec<Option<String>> = names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            if !axes.contains(i) {
                Some(name.clone())
            } else if keepdim {
                Some(None)
            } else {
                None
            }
        })
        .collect();
    if out.iter().all(|n| n.is_none()) {
        None
    } else {
        Some(out)
    }
}

/// Resolves dimension names to positional axes.
///
/// # Errors
/// `InvalidArgument` if the tensor has no axis with one of the names.
pub fn dimnames_to_positions(tensor: &Tensor, names: &[&str]) -> Result<Vec<isize>, ReductaError> {
    let tensor_names = tensor.names().unwrap_or_default();
    names
        .iter()
        .map(|wanted| {
            tensor_names
                .iter()
                .position(|n| n.as_deref() == Some(*wanted))
                .map(|p| p as isize)
                .ok_or_else(|| ReductaError::InvalidArgument {
                    operation: "dimnames_to_positions".to_string(),
                    message: format!("name '{}' not found in {:?}", wanted, tensor_names),
                })
        })
        .collect()
}

/// Single-name variant of [`dimnames_to_positions`].
pub fn dimname_to_position(tensor: &Tensor, name: &str) -> Result<isize, ReductaError> {
    Ok(dimnames_to_positions(tensor, &[name])?[0])
}

/// Whether two tensors carry the same names, an unnamed tensor counting as all-`None`.
pub fn are_names_equal(a: &Tensor, b: &Tensor) -> bool {
    let expand = |t: &Tensor| t.names().unwrap_or_else(|| vec![None; t.rank()]);
    expand(a) == expand(b)
}
