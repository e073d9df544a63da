#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `dnnc-tensor` provides the dense array container used by the DNNC operators:
//! a contiguous, row-major buffer with a compile-time rank and runtime extents.
//!
//! - **Tensor**: shape, row-major strides and shared storage
//! - **TensorStorage**: reference-counted buffer that is never mutated in place
//! - **TensorAllocator**: trait-based memory allocation, [`CpuAllocator`] by default
//!
//! # Quick Start
//!
//! ```rust
//! use dnnc_tensor::{CpuAllocator, Tensor1};
//!
//! let values: Vec<f32> = (0..24).map(|x| x as f32).collect();
//! let t = Tensor1::from_vec(values, CpuAllocator).unwrap();
//!
//! // Same data, new grouping. Nothing is copied.
//! let t3 = t.reshape([2, 4, 3]).unwrap();
//! assert_eq!(t3.shape, [2, 4, 3]);
//! assert_eq!(t3.data(), t.data());
//!
//! // Element counts must agree.
//! assert!(t.reshape([5, 5]).is_err());
//! ```

/// Allocator module containing memory management utilities.
///
/// This module provides the [`TensorAllocator`] trait and the [`CpuAllocator`]
/// backed by the system allocator.
pub mod allocator;

/// Storage module containing the reference-counted element buffer.
pub mod storage;

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::allocator::{CpuAllocator, TensorAllocator};
pub use crate::tensor::{Tensor, TensorError};

/// Type alias for a 1-dimensional tensor.
pub type Tensor1<T, A> = Tensor<T, 1, A>;

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T, A> = Tensor<T, 2, A>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T, A> = Tensor<T, 3, A>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T, A> = Tensor<T, 4, A>;

/// Type alias for a 1-dimensional tensor of `f32` on the CPU, the shape every tensor is created with.
pub type CpuTensor1 = Tensor1<f32, CpuAllocator>;
