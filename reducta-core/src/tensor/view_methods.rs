use std::sync::Arc;

use crate::error::ReductaError;
use crate::ops::reduction::axes::wrap_dim;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    fn make_view(
        &self,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
        names: Option<Vec<Option<String>>>,
    ) -> Tensor {
        let guard = self.read_data();
        Tensor::from_data(TensorData::new_view(
            Arc::clone(&guard.buffer),
            guard.device,
            offset,
            shape,
            strides,
            names,
        ))
    }

    /// Reorders the axes. `dims` must be a permutation of `0..rank`.
    pub fn permute(&self, dims: &[usize]) -> Result<Tensor, ReductaError> {
        let (offset, shape, strides, names) = {
            let guard = self.read_data();
            let rank = guard.rank();
            let mut seen = vec![false; rank];
            if dims.len() != rank {
                return Err(ReductaError::InvalidArgument {
                    operation: "permute".to_string(),
                    message: format!("expected {} dims, got {:?}", rank, dims),
                });
            }
            for &d in dims {
                if d >= rank || seen[d] {
                    return Err(ReductaError::InvalidArgument {
                        operation: "permute".to_string(),
                        message: format!("{:?} is not a permutation of 0..{}", dims, rank),
                    });
                }
                seen[d] = true;
            }
            (
                guard.offset,
                dims.iter().map(|&d| guard.shape[d]).collect::<Vec<_>>(),
                dims.iter().map(|&d| guard.strides[d]).collect::<Vec<_>>(),
                guard
                    .names
                    .as_ref()
                    .map(|n| dims.iter().map(|&d| n[d].clone()).collect::<Vec<_>>()),
            )
        };
        Ok(self.make_view(offset, shape, strides, names))
    }

    /// Swaps two axes.
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Tensor, ReductaError> {
        let rank = self.rank();
        let d0 = wrap_dim(dim0, rank)?;
        let d1 = wrap_dim(dim1, rank)?;
        let mut dims: Vec<usize> = (0..rank).collect();
        dims.swap(d0, d1);
        self.permute(&dims)
    }

    /// View of `length` elements starting at `start` along `dim`.
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Tensor, ReductaError> {
        let (offset, shape, strides, names) = {
            let guard = self.read_data();
            let d = wrap_dim(dim, guard.rank())?;
            if guard.rank() == 0 || start + length > guard.shape[d] {
                return Err(ReductaError::IndexOutOfBounds {
                    index: vec![start, length],
                    shape: guard.shape.clone(),
                });
            }
            let mut shape = guard.shape.clone();
            shape[d] = length;
            let offset = if length == 0 {
                guard.offset
            } else {
                guard.offset + start * guard.strides[d]
            };
            (offset, shape, guard.strides.clone(), guard.names.clone())
        };
        Ok(self.make_view(offset, shape, strides, names))
    }

    /// Removes `dim` by picking position `index` (negative counts from the end).
    pub fn select(&self, dim: isize, index: isize) -> Result<Tensor, ReductaError> {
        let (offset, shape, strides, names) = {
            let guard = self.read_data();
            let rank = guard.rank();
            if rank == 0 {
                return Err(ReductaError::InvalidRank {
                    expected: ">= 1".to_string(),
                    actual: 0,
                    operation: "select".to_string(),
                });
            }
            let d = wrap_dim(dim, rank)?;
            let size = guard.shape[d] as isize;
            let i = if index < 0 { index + size } else { index };
            if i < 0 || i >= size {
                return Err(ReductaError::IndexOutOfBounds {
                    index: vec![index.unsigned_abs()],
                    shape: guard.shape.clone(),
                });
            }
            let mut shape = guard.shape.clone();
            let mut strides = guard.strides.clone();
            shape.remove(d);
            let stride = strides.remove(d);
            let names = guard.names.as_ref().map(|n| {
                let mut n = n.clone();
                n.remove(d);
                n
            });
            (guard.offset + i as usize * stride, shape, strides, names)
        };
        Ok(self.make_view(offset, shape, strides, names))
    }

    /// Inserts a size-1 axis at `dim` (`0..=rank`).
    pub fn unsqueeze(&self, dim: usize) -> Result<Tensor, ReductaError> {
        let (offset, shape, strides, names) = {
            let guard = self.read_data();
            let rank = guard.rank();
            if dim > rank {
                return Err(ReductaError::InvalidAxis {
                    axis: dim as isize,
                    rank: rank + 1,
                });
            }
            let mut shape = guard.shape.clone();
            let mut strides = guard.strides.clone();
            let stride = if dim < rank {
                guard.strides[dim] * guard.shape[dim]
            } else {
                1
            };
            shape.insert(dim, 1);
            strides.insert(dim, stride);
            let names = guard.names.as_ref().map(|n| {
                let mut n = n.clone();
                n.insert(dim, None);
                n
            });
            (guard.offset, shape, strides, names)
        };
        Ok(self.make_view(offset, shape, strides, names))
    }

    /// Removes the size-1 axis `dim`. Axes of another size are left alone.
    pub fn squeeze_dim(&self, dim: usize) -> Result<Tensor, ReductaError> {
        let (offset, shape, strides, names) = {
            let guard = self.read_data();
            if dim >= guard.rank() {
                return Err(ReductaError::InvalidAxis {
                    axis: dim as isize,
                    rank: guard.rank(),
                });
            }
            if guard.shape[dim] != 1 {
                drop(guard);
                return Ok(self.detach());
            }
            let mut shape = guard.shape.clone();
            let mut strides = guard.strides.clone();
            shape.remove(dim);
            strides.remove(dim);
            let names = guard.names.as_ref().map(|n| {
                let mut n = n.clone();
                n.remove(dim);
                n
            });
            (guard.offset, shape, strides, names)
        };
        Ok(self.make_view(offset, shape, strides, names))
    }

    /// Broadcasts size-1 axes (and missing leading axes) to `shape` with zero strides.
    pub fn expand(&self, shape: &[usize]) -> Result<Tensor, ReductaError> {
        let (offset, strides, names) = {
            let guard = self.read_data();
            let rank = guard.rank();
            if shape.len() < rank {
                return Err(ReductaError::ShapeMismatch {
                    expected: shape.to_vec(),
                    actual: guard.shape.clone(),
                    operation: "expand".to_string(),
                });
            }
            let lead = shape.len() - rank;
            let mut strides = vec![0; shape.len()];
            for i in 0..rank {
                let (src, dst) = (guard.shape[i], shape[lead + i]);
                if src == dst {
                    strides[lead + i] = guard.strides[i];
                } else if src != 1 {
                    return Err(ReductaError::ShapeMismatch {
                        expected: shape.to_vec(),
                        actual: guard.shape.clone(),
                        operation: "expand".to_string(),
                    });
                }
            }
            let names = guard.names.as_ref().map(|n| {
                let mut full = vec![None; lead];
                full.extend(n.iter().cloned());
                full
            });
            (guard.offset, strides, names)
        };
        Ok(self.make_view(offset, shape.to_vec(), strides, names))
    }

    /// Same elements under a new shape. Non-contiguous inputs are copied first.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor, ReductaError> {
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(ReductaError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: self.shape(),
                operation: "reshape".to_string(),
            });
        }
        let source = self.contiguous()?;
        let offset = source.read_data().offset;
        Ok(source.make_view(
            offset,
            shape.to_vec(),
            crate::tensor::utils::calculate_strides(shape),
            None,
        ))
    }

    /// Returns a tensor with row-major layout, copying only when needed.
    pub fn contiguous(&self) -> Result<Tensor, ReductaError> {
        let guard = self.read_data();
        if guard.is_contiguous() {
            drop(guard);
            return Ok(self.detach());
        }
        let (shape, names, dtype) = (guard.shape.clone(), guard.names.clone(), guard.dtype);
        let copy = dispatch_dtype!(dtype, T => {
            Tensor::from_vec(guard.gather::<T>()?, shape)?
        });
        copy.write_data().names = names;
        Ok(copy)
    }
}

#[cfg(test)]
#[path = "view_methods_test.rs"]
mod tests;
