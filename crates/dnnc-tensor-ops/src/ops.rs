use dnnc_tensor::{Tensor, TensorAllocator};
use num_traits::Float;

use crate::{error::TensorOpsError, unary};

/// Relative tolerance used when comparing operator results against a reference.
pub const DEFAULT_RTOL: f32 = 1e-3;

/// Absolute tolerance used when comparing operator results against a reference.
pub const DEFAULT_ATOL: f32 = 1e-3;

/// Method-style access to the elementwise operators.
///
/// # Example
///
/// ```
/// use dnnc_tensor::{CpuAllocator, Tensor1};
/// use dnnc_tensor_ops::TensorOps;
///
/// let t = Tensor1::from_vec(vec![-2.0f32, 0.0, 3.5], CpuAllocator).unwrap();
/// assert_eq!(t.sign().unwrap().data(), vec![-1.0, 0.0, 1.0]);
/// assert_eq!(t.hardsigmoid(0.2, 0.4).unwrap().data()[1], 0.4);
/// ```
pub trait TensorOps<T, const N: usize, A: TensorAllocator> {
    /// See [`unary::sign`].
    fn sign(&self) -> Result<Tensor<T, N, A>, TensorOpsError>;

    /// See [`unary::hardsigmoid`].
    fn hardsigmoid(&self, alpha: T, beta: T) -> Result<Tensor<T, N, A>, TensorOpsError>;
}

impl<T, const N: usize, A> TensorOps<T, N, A> for Tensor<T, N, A>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    fn sign(&self) -> Result<Tensor<T, N, A>, TensorOpsError> {
        unary::sign(self)
    }

    fn hardsigmoid(&self, alpha: T, beta: T) -> Result<Tensor<T, N, A>, TensorOpsError> {
        unary::hardsigmoid(self, alpha, beta)
    }
}

/// Returns true if `actual` is within `atol + rtol * |expected|` of `expected`.
///
/// Equal infinities are close; NaN is never close to anything.
#[inline]
pub fn is_close<T: Float>(actual: T, expected: T, rtol: T, atol: T) -> bool {
    actual == expected || (actual - expected).abs() <= atol + rtol * expected.abs()
}

/// Returns true if both sequences have the same length and every pair is [`is_close`].
///
/// # Example
///
/// ```
/// use dnnc_tensor_ops::ops::{allclose, DEFAULT_ATOL, DEFAULT_RTOL};
///
/// assert!(allclose(&[1.0f32, 0.0], &[1.0005, 0.0009], DEFAULT_RTOL, DEFAULT_ATOL));
/// assert!(!allclose(&[1.0f32], &[1.01], DEFAULT_RTOL, DEFAULT_ATOL));
/// ```
pub fn allclose<T: Float>(actual: &[T], expected: &[T], rtol: T, atol: T) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(&a, &e)| is_close(a, e, rtol, atol))
}

/// Tensor version of [`allclose`].
///
/// # Errors
///
/// Returns an error if the two tensors do not have the same shape.
pub fn allclose_tensor<T, const N: usize, A>(
    actual: &Tensor<T, N, A>,
    expected: &Tensor<T, N, A>,
    rtol: T,
    atol: T,
) -> Result<bool, TensorOpsError>
where
    T: Float,
    A: TensorAllocator,
{
    let close = actual.element_wise_op(expected, |&a, &e| is_close(a, e, rtol, atol))?;
    Ok(close.iter().all(|&c| c))
}
