use thiserror::Error;

use crate::{
    allocator::{TensorAllocator, TensorAllocatorError},
    storage::TensorStorage,
};

/// Error type for tensor creation and layout operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// A reshape was requested whose element count differs from the tensor's.
    ///
    /// This is the only error `reshape` can return. The source tensor is left
    /// untouched.
    ///
    /// # Example
    /// ```ignore
    /// // Error: 24 elements cannot be viewed as a 5x5 tensor
    /// let t = Tensor1::from_vec(vec![0.0f32; 24], CpuAllocator)?;
    /// let r = t.reshape([5, 5]);
    /// ```
    #[error("Cannot reshape tensor of shape {current:?} ({numel} elements) into shape {requested:?}")]
    ShapeError {
        /// The shape that was requested.
        requested: Vec<usize>,
        /// The shape of the source tensor.
        current: Vec<usize>,
        /// The number of elements in the source tensor.
        numel: usize,
    },

    /// Tensor shape does not match the provided data.
    ///
    /// The product of the shape dimensions must equal the data length exactly.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Flat offset exceeds the number of elements.
    #[error("Index {index} out of bounds for tensor of size {size}")]
    IndexOutOfBounds {
        /// The invalid offset that was attempted
        index: usize,
        /// The number of elements in the tensor
        size: usize,
    },

    /// Two tensors combined elementwise do not have the same shape.
    #[error("Dimension mismatch: expected shape {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Shape of the left-hand side
        expected: Vec<usize>,
        /// Shape of the right-hand side
        actual: Vec<usize>,
    },

    /// Underlying storage operation failed.
    #[error("Storage error: {0}")]
    StorageError(#[from] TensorAllocatorError),
}

impl TensorError {
    /// Creates an InvalidShape error.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// The rightmost dimension has stride 1, and each dimension's stride is the
/// product of all dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use dnnc_tensor::tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

// `None` when the element count does not fit in a usize.
fn checked_numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// A dense multi-dimensional array.
///
/// `Tensor` combines reference-counted storage with a shape and row-major
/// strides. The rank `N` is a const generic, so the number of dimensions is
/// checked at compile time while the extents are runtime values.
///
/// Element values are never mutated after construction. Layout operations
/// such as [`Tensor::reshape`] therefore hand out new tensors that share the
/// same buffer, and every elementwise transform allocates a fresh one.
///
/// # Type Parameters
///
/// * `T` - The element type stored in the tensor
/// * `N` - The number of dimensions
/// * `A` - The allocator that owns the buffer
///
/// # Examples
///
/// ```rust
/// use dnnc_tensor::{CpuAllocator, Tensor1};
///
/// let t = Tensor1::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], CpuAllocator).unwrap();
/// let m = t.reshape([2, 3]).unwrap();
/// assert_eq!(m.shape, [2, 3]);
/// assert_eq!(m.get([1, 0]), Some(&4.0));
/// assert_eq!(m.data(), t.data());
/// ```
pub struct Tensor<T, const N: usize, A: TensorAllocator> {
    /// The storage of the tensor.
    pub storage: TensorStorage<T, A>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, A: TensorAllocator> Tensor<T, 1, A> {
    /// Creates a rank-1 tensor holding `data`.
    ///
    /// # Errors
    ///
    /// Only fails if the allocator cannot provide the buffer.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::from_vec(vec![-2.0f32, 0.0, 3.5], CpuAllocator).unwrap();
    /// assert_eq!(t.shape, [3]);
    /// ```
    pub fn from_vec(data: Vec<T>, alloc: A) -> Result<Self, TensorError> {
        let len = data.len();
        Self::from_shape_vec([len], data, alloc)
    }
}

impl<T, const N: usize, A: TensorAllocator> Tensor<T, N, A> {
    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::from_shape_vec([2, 2], vec![1u8, 2, 3, 4], CpuAllocator).unwrap();
    /// assert_eq!(t.shape, [2, 2]);
    /// assert_eq!(t.strides, [2, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>, alloc: A) -> Result<Self, TensorError> {
        let numel = checked_numel(&shape).unwrap_or(usize::MAX);
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data, alloc)?;
        Ok(Self {
            storage,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Creates a new `Tensor` with the given shape, copying the data from a slice.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape, an error is returned.
    pub fn from_shape_slice(shape: [usize; N], data: &[T], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec(), alloc)
    }

    /// Creates a new `Tensor` with every element set to `value`.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor3};
    ///
    /// let t = Tensor3::from_shape_val([2, 1, 3], 2u8, CpuAllocator).unwrap();
    /// assert_eq!(t.as_slice(), &[2, 2, 2, 2, 2, 2]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], value: T, alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = checked_numel(&shape).ok_or(TensorError::invalid_shape(usize::MAX, 0))?;
        Self::from_shape_vec(shape, vec![value; numel], alloc)
    }

    /// Creates a new `Tensor` by calling `f` with the row-major index of every element.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::from_shape_fn([2, 2], CpuAllocator, |[i, j]| (i * 2 + j) as u8).unwrap();
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], alloc: A, f: F) -> Result<Self, TensorError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = checked_numel(&shape).ok_or(TensorError::invalid_shape(usize::MAX, 0))?;
        let data: Vec<T> = (0..numel)
            .map(|i| {
                let mut index = [0; N];
                let mut j = i;
                for k in (0..N).rev() {
                    index[k] = j % shape[k];
                    j /= shape[k];
                }
                f(index)
            })
            .collect();
        Self::from_shape_vec(shape, data, alloc)
    }

    /// Creates a new `Tensor` filled with zeros.
    pub fn zeros(shape: [usize; N], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero(), alloc)
    }

    /// Returns the elements in row-major order as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns a copy of the elements in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], CpuAllocator).unwrap();
    /// let m = t.reshape([2, 2]).unwrap();
    /// assert_eq!(m.data(), vec![1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn data(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }

    /// Returns a pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Returns an iterator over the elements in row-major order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of dimensions.
    #[inline]
    pub const fn rank(&self) -> usize {
        N
    }

    /// Get the flat offset of the element at the given index.
    ///
    /// Returns `None` if any component is outside its dimension.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the index of the element at the given flat offset. The reverse of
    /// [`Tensor::get_iter_offset`].
    ///
    /// # Errors
    ///
    /// If the offset is out of bounds (>= numel), an error is returned.
    pub fn get_index(&self, offset: usize) -> Result<[usize; N], TensorError> {
        let numel = self.numel();
        if offset >= numel {
            return Err(TensorError::index_out_of_bounds(offset, numel));
        }
        // every extent is non-zero here, so every stride is too
        let mut idx = [0; N];
        let mut rem = offset;
        for (i, &stride) in self.strides.iter().enumerate() {
            idx[i] = rem / stride;
            rem %= stride;
        }
        Ok(idx)
    }

    /// Get a reference to the element at the given index, if it is in bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::from_shape_vec([2, 2], vec![1u8, 2, 3, 4], CpuAllocator).unwrap();
    /// assert_eq!(t.get([1, 0]), Some(&3));
    /// assert!(t.get([2, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|i| self.as_slice().get(i))
    }

    /// Get a reference to the element at the given index without bounds checks.
    ///
    /// # Safety
    ///
    /// Every component of `index` must be smaller than the matching dimension.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::from_shape_vec([2, 2], vec![1u8, 2, 3, 4], CpuAllocator).unwrap();
    /// assert_eq!(unsafe { *t.get_unchecked([1, 0]) }, 3);
    /// ```
    pub unsafe fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = index
            .iter()
            .zip(self.strides)
            .fold(0, |acc, (&idx, stride)| acc + idx * stride);
        // SAFETY: the caller keeps `index` inside the shape, so `offset < numel`.
        unsafe { self.as_slice().get_unchecked(offset) }
    }

    /// Reinterprets the tensor under a new shape.
    ///
    /// The returned tensor shares this tensor's buffer: no element is copied or
    /// reordered, only the shape and the row-major strides change. Rank may
    /// change freely.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeError`] if the product of `shape` differs from
    /// [`Tensor::numel`]. `self` is unchanged in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::from_vec((0..24).map(|x| x as f32).collect(), CpuAllocator).unwrap();
    /// let t4 = t.reshape([2, 2, 2, 3]).unwrap();
    /// assert_eq!(t4.strides, [12, 6, 3, 1]);
    /// assert_eq!(t4.get([1, 0, 1, 2]), Some(&17.0));
    /// assert!(t.reshape([5, 5]).is_err());
    /// ```
    pub fn reshape<const M: usize>(&self, shape: [usize; M]) -> Result<Tensor<T, M, A>, TensorError> {
        let numel = self.numel();
        if checked_numel(&shape) != Some(numel) {
            return Err(TensorError::ShapeError {
                requested: shape.to_vec(),
                current: self.shape.to_vec(),
                numel,
            });
        }

        log::debug!("reshape {:?} -> {:?}", self.shape, shape);

        Ok(Tensor {
            storage: self.storage.clone(),
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Returns the rank-1 view of the tensor. Never fails.
    pub fn flatten(&self) -> Tensor<T, 1, A> {
        Tensor {
            storage: self.storage.clone(),
            shape: [self.numel()],
            strides: [1],
        }
    }

    /// Apply a function to each element, producing a new tensor of the same shape.
    ///
    /// # Example
    ///
    /// ```
    /// use dnnc_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::from_vec(vec![1u8, 2, 3, 4], CpuAllocator).unwrap();
    /// let t2 = t.map(|x| *x + 1).unwrap();
    /// assert_eq!(t2.as_slice(), &[2, 3, 4, 5]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Result<Tensor<U, N, A>, TensorError>
    where
        F: Fn(&T) -> U,
    {
        let data: Vec<U> = self.iter().map(f).collect();
        Tensor::from_shape_vec(self.shape, data, self.storage.alloc().clone())
    }

    /// Combine two tensors of identical shape element by element.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::DimensionMismatch`] if the shapes differ.
    pub fn element_wise_op<U, V, F>(
        &self,
        other: &Tensor<U, N, A>,
        op: F,
    ) -> Result<Tensor<V, N, A>, TensorError>
    where
        F: Fn(&T, &U) -> V,
    {
        if self.shape != other.shape {
            return Err(TensorError::DimensionMismatch {
                expected: self.shape.to_vec(),
                actual: other.shape.to_vec(),
            });
        }

        let data: Vec<V> = self
            .iter()
            .zip(other.iter())
            .map(|(a, b)| op(a, b))
            .collect();

        Tensor::from_shape_vec(self.shape, data, self.storage.alloc().clone())
    }
}

impl<T, const N: usize, A: TensorAllocator> Clone for Tensor<T, N, A> {
    /// Shares the buffer with the clone.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

impl<T, const N: usize, A: TensorAllocator> std::fmt::Debug for Tensor<T, N, A>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("data", &self.as_slice())
            .finish()
    }
}

fn write_block(
    f: &mut std::fmt::Formatter<'_>,
    cells: &[String],
    shape: &[usize],
    depth: usize,
    width: usize,
) -> std::fmt::Result {
    write!(f, "[")?;
    match shape {
        [] => {
            if let Some(cell) = cells.first() {
                write!(f, "{cell:>width$}")?;
            }
        }
        [_] => {
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{cell:>width$}")?;
            }
        }
        [outer, inner @ ..] => {
            let block = inner.iter().product::<usize>();
            for i in 0..*outer {
                if i > 0 {
                    write!(f, ",{}{}", "\n".repeat(inner.len()), " ".repeat(depth + 1))?;
                }
                write_block(f, &cells[i * block..(i + 1) * block], inner, depth + 1, width)?;
            }
        }
    }
    write!(f, "]")
}

impl<T, const N: usize, A: TensorAllocator> std::fmt::Display for Tensor<T, N, A>
where
    T: std::fmt::Display,
{
    /// Nested brackets, one level per dimension. `{:.p}` sets the float precision.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<String> = match f.precision() {
            Some(p) => self.iter().map(|v| format!("{v:.p$}")).collect(),
            None => self.iter().map(|v| v.to_string()).collect(),
        };
        let width = cells.iter().map(|c| c.len()).max().unwrap_or(0);
        write_block(f, &cells, &self.shape, 0, width)
    }
}
