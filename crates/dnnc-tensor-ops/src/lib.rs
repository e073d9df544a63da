#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for tensor operations.
///
/// Defines [`TensorOpsError`] for handling failures during tensor computations.
pub mod error;

/// Scalar kernels for the elementwise operators.
pub mod kernels;

/// Tensor comparison helpers and the [`TensorOps`] trait.
pub mod ops;

/// Execution strategies for elementwise operations.
pub mod parallel;

/// Shape-preserving unary operators: `sign` and `hardsigmoid`.
pub mod unary;

pub use error::TensorOpsError;
pub use ops::TensorOps;
pub use parallel::ExecutionStrategy;
pub use unary::{hardsigmoid, sign, HardSigmoidParams};
