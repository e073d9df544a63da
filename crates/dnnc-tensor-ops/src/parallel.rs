use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The chunk length for ParallelChunks must be valid.
    #[error("chunk length must be > 0 for ParallelChunks strategy")]
    InvalidChunkSize,
}

/// Controls how an elementwise operation is executed.
///
/// Every element of the output depends only on the matching input element, so
/// all strategies produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process every element in parallel.
    #[default]
    ParallelElements,

    /// Use the global Rayon thread pool on chunks of the given number of elements.
    ParallelChunks(usize),

    /// Run sequentially on the current thread.
    ///
    /// Useful for small tensors, debugging, or when the overhead of
    /// parallelization outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call.
    Fixed(usize),
}

/// Apply `f` to every element of `src`, keeping the element order.
///
/// # Errors
///
/// Returns an error if the strategy is misconfigured or its thread pool cannot be built.
///
/// # Example
///
/// ```
/// use dnnc_tensor_ops::parallel::{map_elements, ExecutionStrategy};
///
/// let out = map_elements(&[1.0f32, -2.0], ExecutionStrategy::Serial, |x| x * 2.0).unwrap();
/// assert_eq!(out, vec![2.0, -4.0]);
/// ```
pub fn map_elements<T, U, F>(
    src: &[T],
    strategy: ExecutionStrategy,
    f: F,
) -> Result<Vec<U>, ParallelError>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Send + Sync,
{
    match strategy {
        ExecutionStrategy::Serial => Ok(src.iter().map(f).collect()),
        ExecutionStrategy::ParallelElements => Ok(src.par_iter().map(f).collect()),
        ExecutionStrategy::ParallelChunks(0) => Err(ParallelError::InvalidChunkSize),
        ExecutionStrategy::ParallelChunks(len) => Ok(src
            .par_chunks(len)
            .flat_map_iter(|chunk| chunk.iter().map(&f))
            .collect()),
        ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
        ExecutionStrategy::Fixed(num_threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            log::debug!("built local thread pool with {num_threads} threads");
            Ok(pool.install(|| src.par_iter().map(&f).collect()))
        }
    }
}
