use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

/// An error type for tensor allocator operations.
#[derive(Debug, Error, PartialEq)]
pub enum TensorAllocatorError {
    /// The requested buffer cannot be described by a valid memory layout.
    #[error("Invalid tensor layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,
}

/// A trait for allocating and deallocating the memory backing a tensor.
///
/// Implementors must be cheap to clone: every tensor sharing a buffer keeps
/// its own handle to the allocator that will release it.
///
/// # Safety
///
/// The tensor allocator must be thread-safe.
pub trait TensorAllocator: Clone {
    /// Allocates memory for a tensor with the given layout.
    ///
    /// The layout always has a non-zero size.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError>;

    /// Deallocates memory previously returned by [`TensorAllocator::alloc`].
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// A tensor allocator that uses the system allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuAllocator;

impl TensorAllocator for CpuAllocator {
    /// Allocates memory for a tensor with the given layout.
    ///
    /// # Arguments
    ///
    /// * `layout` - The layout of the tensor buffer.
    ///
    /// # Returns
    ///
    /// A non-null pointer to the allocated memory if successful, otherwise an error.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(TensorAllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    /// Deallocates memory for a tensor with the given layout.
    ///
    /// Null pointers are ignored.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_allocator_roundtrip() -> Result<(), TensorAllocatorError> {
        let allocator = CpuAllocator;
        let layout = Layout::array::<f32>(24).map_err(TensorAllocatorError::LayoutError)?;
        let ptr = allocator.alloc(layout)?;
        assert!(!ptr.is_null());
        assert_eq!(ptr as usize % std::mem::align_of::<f32>(), 0);
        allocator.dealloc(ptr, layout);
        Ok(())
    }

    #[test]
    fn cpu_allocator_ignores_null() {
        let layout = Layout::new::<f32>();
        CpuAllocator.dealloc(std::ptr::null_mut(), layout);
    }
}
