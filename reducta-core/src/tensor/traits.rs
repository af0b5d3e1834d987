use crate::tensor::Tensor;
use std::fmt::{self, Debug};
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: both handles share the same `TensorData`.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        write!(
            f,
            "Tensor(shape={:?}, dtype={:?}, device={:?}, strides={:?}, offset={}",
            td.shape, td.dtype, td.device, td.strides, td.offset
        )?;
        if let Some(names) = &td.names {
            write!(f, ", names={:?}", names)?;
        }
        if td.requires_grad {
            write!(f, ", requires_grad=true")?;
        }
        write!(f, ")")
    }
}
