use dnnc_tensor::{Tensor, TensorAllocator};
use num_traits::Float;

use crate::{
    error::TensorOpsError,
    kernels,
    parallel::{self, ExecutionStrategy},
};

/// Attributes of the hard sigmoid operator.
///
/// The defaults follow the ONNX `HardSigmoid` operator: `alpha = 0.2`, `beta = 0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardSigmoidParams<T> {
    /// Slope applied to every element.
    pub alpha: T,
    /// Offset added after scaling.
    pub beta: T,
}

impl<T> HardSigmoidParams<T> {
    /// Create a new set of hard sigmoid attributes.
    pub fn new(alpha: T, beta: T) -> Self {
        Self { alpha, beta }
    }
}

impl Default for HardSigmoidParams<f32> {
    fn default() -> Self {
        Self::new(0.2, 0.5)
    }
}

impl Default for HardSigmoidParams<f64> {
    fn default() -> Self {
        Self::new(0.2, 0.5)
    }
}

/// Apply a scalar function to every element of a tensor.
///
/// The output has the shape of `src` and a freshly allocated buffer.
///
/// # Arguments
///
/// * `src` - The input tensor.
/// * `strategy` - How the elements are distributed across threads.
/// * `f` - The function computing one output element from one input element.
///
/// # Errors
///
/// Returns an error if the strategy is invalid or the output cannot be allocated.
pub fn unary_op<T, U, const N: usize, A, F>(
    src: &Tensor<T, N, A>,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<Tensor<U, N, A>, TensorOpsError>
where
    T: Sync,
    U: Send,
    A: TensorAllocator,
    F: Fn(&T) -> U + Send + Sync,
{
    log::trace!(
        "unary op over {:?} ({} elements) with {:?}",
        src.shape,
        src.numel(),
        strategy
    );
    let data = parallel::map_elements(src.as_slice(), strategy, f)?;
    Ok(Tensor::from_shape_vec(
        src.shape,
        data,
        src.storage.alloc().clone(),
    )?)
}

/// Compute the sign of every element.
///
/// Each output element is `1` for positive input, `-1` for negative input and
/// `0` for zero. See [`kernels::sign`].
///
/// # Example
///
/// ```
/// use dnnc_tensor::{CpuAllocator, Tensor1};
/// use dnnc_tensor_ops::unary::sign;
///
/// let t = Tensor1::from_vec(vec![-2.0f32, 0.0, 3.5], CpuAllocator).unwrap();
/// let s = sign(&t).unwrap();
/// assert_eq!(s.data(), vec![-1.0, 0.0, 1.0]);
/// ```
pub fn sign<T, const N: usize, A>(src: &Tensor<T, N, A>) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    sign_with(src, ExecutionStrategy::default())
}

/// Same as [`sign`] with an explicit execution strategy.
pub fn sign_with<T, const N: usize, A>(
    src: &Tensor<T, N, A>,
    strategy: ExecutionStrategy,
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    unary_op(src, strategy, |&x| kernels::sign(x))
}

/// Compute `clip(alpha * x + beta, 0, 1)` for every element `x`.
///
/// `alpha` and `beta` are not validated; zero, negative and large values are
/// all accepted. Every finite output lies in `[0, 1]`.
///
/// # Example
///
/// ```
/// use dnnc_tensor::{CpuAllocator, Tensor1};
/// use dnnc_tensor_ops::unary::hardsigmoid;
///
/// let t = Tensor1::from_vec(vec![-5.0f32, 0.0, 1.0, 5.0], CpuAllocator).unwrap();
/// let h = hardsigmoid(&t.reshape([2, 2]).unwrap(), 0.2, 0.4).unwrap();
/// assert_eq!(h.shape, [2, 2]);
/// assert_eq!(h.data()[0], 0.0);
/// assert_eq!(h.data()[3], 1.0);
/// ```
pub fn hardsigmoid<T, const N: usize, A>(
    src: &Tensor<T, N, A>,
    alpha: T,
    beta: T,
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    hardsigmoid_with(src, alpha, beta, ExecutionStrategy::default())
}

/// Same as [`hardsigmoid`] with an explicit execution strategy.
pub fn hardsigmoid_with<T, const N: usize, A>(
    src: &Tensor<T, N, A>,
    alpha: T,
    beta: T,
    strategy: ExecutionStrategy,
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    unary_op(src, strategy, move |&x| kernels::hardsigmoid(x, alpha, beta))
}

/// Same as [`hardsigmoid`], reading the attributes from `params`.
pub fn hardsigmoid_params<T, const N: usize, A>(
    src: &Tensor<T, N, A>,
    params: &HardSigmoidParams<T>,
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float + Send + Sync,
    A: TensorAllocator,
{
    hardsigmoid(src, params.alpha, params.beta)
}

#[cfg(test)]
mod tests {
    use dnnc_tensor::{CpuAllocator, Tensor1, TensorError};

    use super::*;

    #[test]
    fn test_sign_1d() -> Result<(), TensorOpsError> {
        let t = Tensor1::from_vec(vec![-2.0f32, 0.0, 3.5], CpuAllocator)?;
        let s = sign(&t)?;
        assert_eq!(s.shape, [3]);
        assert_eq!(s.as_slice(), &[-1.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_sign_does_not_touch_input() -> Result<(), TensorOpsError> {
        let t = Tensor1::from_vec(vec![-0.5f32, 0.25, 0.0, 7.0], CpuAllocator)?;
        let s = sign(&t)?;
        assert_eq!(t.as_slice(), &[-0.5, 0.25, 0.0, 7.0]);
        assert!(!s.storage.ptr_eq(&t.storage));
        Ok(())
    }

    #[test]
    fn test_hardsigmoid_2d() -> Result<(), TensorOpsError> {
        let t = Tensor1::from_vec(vec![-3.0f32, -1.0, 0.0, 1.0, 2.0, 3.0], CpuAllocator)?;
        let h = hardsigmoid(&t.reshape([2, 3])?, 0.2, 0.4)?;
        assert_eq!(h.shape, [2, 3]);
        let expected = [0.0f32, 0.2, 0.4, 0.6, 0.8, 1.0];
        for (a, e) in h.iter().zip(expected) {
            approx::assert_relative_eq!(*a, e, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_hardsigmoid_params_default() -> Result<(), TensorOpsError> {
        let params = HardSigmoidParams::<f32>::default();
        assert_eq!(params, HardSigmoidParams::new(0.2, 0.5));

        let t = Tensor1::from_vec(vec![0.0f32, 5.0, -5.0], CpuAllocator)?;
        let h = hardsigmoid_params(&t, &params)?;
        assert_eq!(h.as_slice(), &[0.5, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_strategies_agree() -> Result<(), TensorOpsError> {
        let data: Vec<f64> = (0..500).map(|i| (i as f64 - 250.0) / 37.0).collect();
        let t = Tensor1::from_vec(data, CpuAllocator)?.reshape([5, 10, 10])?;

        let serial = hardsigmoid_with(&t, 0.11, 0.22, ExecutionStrategy::Serial)?;
        for strategy in [
            ExecutionStrategy::ParallelElements,
            ExecutionStrategy::ParallelChunks(64),
            ExecutionStrategy::Fixed(3),
        ] {
            assert_eq!(hardsigmoid_with(&t, 0.11, 0.22, strategy)?.data(), serial.data());
            assert_eq!(
                sign_with(&t, strategy)?.data(),
                sign_with(&t, ExecutionStrategy::Serial)?.data()
            );
        }
        Ok(())
    }

    #[test]
    fn test_invalid_strategy() -> Result<(), TensorError> {
        let t = Tensor1::from_vec(vec![1.0f32], CpuAllocator)?;
        let res = sign_with(&t, ExecutionStrategy::Fixed(0));
        assert!(res.is_err_and(|e| matches!(
            e,
            TensorOpsError::ParallelError(crate::parallel::ParallelError::InvalidThreadCount(0))
        )));
        Ok(())
    }
}
