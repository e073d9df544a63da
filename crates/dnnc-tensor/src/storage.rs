//! Reference-counted tensor storage.
//!
//! A [`TensorStorage`] owns one contiguous buffer obtained from a
//! [`TensorAllocator`]. Cloning the storage only bumps a reference count, which
//! is what lets a reshaped tensor share its source buffer without copying.

use std::{alloc::Layout, marker::PhantomData, ptr::NonNull, sync::Arc};

use crate::allocator::{TensorAllocator, TensorAllocatorError};

/// The allocation shared by every [`TensorStorage`] handle.
struct StorageImpl<T, A: TensorAllocator> {
    /// Pointer to the first element. Dangling (but aligned) when the buffer is empty.
    ptr: NonNull<T>,
    /// Number of initialized elements.
    len: usize,
    /// Layout used for the allocation, `None` when nothing was allocated.
    layout: Option<Layout>,
    /// The allocator that owns the memory.
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: TensorAllocator> Drop for StorageImpl<T, A> {
    fn drop(&mut self) {
        // SAFETY: the first `len` elements were initialized in `from_vec` and
        // nobody else can observe them once the last handle is gone.
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ));
        }
        if let Some(layout) = self.layout {
            self.alloc.dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

/// Immutable, reference-counted buffer of tensor elements.
pub struct TensorStorage<T, A: TensorAllocator> {
    inner: Arc<StorageImpl<T, A>>,
}

impl<T, A: TensorAllocator> TensorStorage<T, A> {
    /// Moves the elements of `data` into a buffer obtained from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is invalid or the allocator fails.
    pub fn from_vec(mut data: Vec<T>, alloc: A) -> Result<Self, TensorAllocatorError> {
        let len = data.len();
        let layout = Layout::array::<T>(len).map_err(TensorAllocatorError::LayoutError)?;

        let (ptr, layout) = if layout.size() == 0 {
            // SAFETY: zero-sized elements need no copy; the storage takes over dropping them.
            unsafe { data.set_len(0) };
            (NonNull::dangling(), None)
        } else {
            let raw = alloc.alloc(layout)? as *mut T;
            let ptr = NonNull::new(raw).ok_or(TensorAllocatorError::NullPointer)?;
            // SAFETY: both regions hold `len` elements and do not overlap. Setting the
            // length to zero afterwards hands ownership of the elements to the new buffer
            // while still letting `data` free its own allocation.
            unsafe {
                std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.as_ptr(), len);
                data.set_len(0);
            }
            (ptr, Some(layout))
        };

        Ok(Self {
            inner: Arc::new(StorageImpl {
                ptr,
                len,
                layout,
                alloc,
                _marker: PhantomData,
            }),
        })
    }

    /// Returns the storage data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is aligned and valid for `len` initialized elements.
        unsafe { std::slice::from_raw_parts(self.inner.ptr.as_ptr(), self.inner.len) }
    }

    /// Returns the pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.inner.ptr.as_ptr()
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Returns the allocator that owns the buffer.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.inner.alloc
    }

    /// Returns true if no other handle shares this buffer.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Returns true if both handles point at the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, A: TensorAllocator> Clone for TensorStorage<T, A> {
    /// O(1): only the reference count is incremented.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// SAFETY: the buffer is never mutated after construction, so sharing it across
// threads is sound whenever the elements and the allocator are.
unsafe impl<T: Send + Sync, A: TensorAllocator + Send + Sync> Send for TensorStorage<T, A> {}

// SAFETY: see `Send`; all access through `&self` is read-only.
unsafe impl<T: Send + Sync, A: TensorAllocator + Send + Sync> Sync for TensorStorage<T, A> {}

impl<T, A: TensorAllocator> std::fmt::Debug for TensorStorage<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.inner.ptr)
            .field("len", &self.inner.len)
            .field("layout", &self.inner.layout)
            .field("is_unique", &self.is_unique())
            .finish()
    }
}
