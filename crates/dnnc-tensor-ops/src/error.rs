use dnnc_tensor::TensorError;
use thiserror::Error;

use crate::parallel::ParallelError;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorOpsError {
    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),

    /// Parallel execution error
    #[error(transparent)]
    ParallelError(#[from] ParallelError),
}
