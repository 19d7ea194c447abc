//! Exclusively owned native heap allocation with explicit, idempotent release.
//!
//! `OwningBuffer` is the backing store for every other buffer in this crate.
//! It is non-copyable: the only way to hand the allocation to another owner is
//! to move the value, or to [`take`](OwningBuffer::take) it out of a place that
//! must remain valid, which leaves the source in the empty ("moved-from") state.
//!
//! # Invariants
//!
//! - The pointer is null if and only if the length is zero.
//! - `release` frees the allocation at most once; releasing an empty buffer is
//!   a no-op, so neither `Drop` after an explicit release nor a release after
//!   `take` can double-free.

use std::alloc::{Layout, alloc, alloc_zeroed, dealloc};

use edc_common::{Result, error::Error, verify_arg};

/// A single exclusively owned contiguous native allocation.
pub struct OwningBuffer {
    /// Base address, null when the buffer is empty.
    ptr: *mut u8,
    /// Allocation size in bytes.
    len: usize,
    /// Alignment the allocation was made with, required for deallocation.
    alignment: usize,
}

impl OwningBuffer {
    /// Alignment used by the allocation helpers that do not take an explicit one.
    pub const DEFAULT_ALIGNMENT: usize = 16;

    /// Creates an empty buffer: null address, zero length.
    pub const fn new() -> OwningBuffer {
        OwningBuffer {
            ptr: std::ptr::null_mut(),
            len: 0,
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }

    /// Allocates `size` bytes of uninitialized memory.
    ///
    /// # Safety
    ///
    /// The contents are uninitialized. The caller must write every byte before
    /// it is read through [`as_bytes`](Self::as_bytes), [`typed_data`](Self::typed_data)
    /// or `Deref`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if the host cannot satisfy the request and
    /// `CapacityOverflow` if `size` cannot be described by an allocation layout.
    pub unsafe fn allocate(size: usize) -> Result<OwningBuffer> {
        unsafe { Self::allocate_aligned(size, Self::DEFAULT_ALIGNMENT) }
    }

    /// Allocates `size` bytes of uninitialized memory aligned to `alignment`.
    ///
    /// # Safety
    ///
    /// Same contract as [`allocate`](Self::allocate).
    pub unsafe fn allocate_aligned(size: usize, alignment: usize) -> Result<OwningBuffer> {
        Self::allocate_impl(size, alignment, false)
    }

    /// Allocates `size` zero-filled bytes.
    pub fn allocate_zeroed(size: usize) -> Result<OwningBuffer> {
        Self::allocate_zeroed_aligned(size, Self::DEFAULT_ALIGNMENT)
    }

    /// Allocates `size` zero-filled bytes aligned to `alignment`.
    pub fn allocate_zeroed_aligned(size: usize, alignment: usize) -> Result<OwningBuffer> {
        Self::allocate_impl(size, alignment, true)
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Result<OwningBuffer> {
        let buf = unsafe { Self::allocate(data.len())? };
        if !data.is_empty() {
            unsafe {
                std::ptr::copy_nonoverlapping(data.as_ptr(), buf.ptr, data.len());
            }
        }
        Ok(buf)
    }

    /// Frees the allocation, if any, and resets this buffer to the empty state.
    ///
    /// Calling `release` on an empty or already released buffer does nothing.
    pub fn release(&mut self) {
        if !self.ptr.is_null() {
            // The layout was validated when the allocation was made.
            unsafe {
                let layout = Layout::from_size_align_unchecked(self.len, self.alignment);
                dealloc(self.ptr, layout);
            }
        }
        self.ptr = std::ptr::null_mut();
        self.len = 0;
    }

    /// Transfers the allocation to a new owner, leaving `self` empty.
    pub fn take(&mut self) -> OwningBuffer {
        std::mem::take(self)
    }

    /// Returns the size of the allocation in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no allocation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the alignment of the allocation.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Returns the base address, null for an empty buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Returns the mutable base address, null for an empty buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    /// Returns the contents as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        if self.ptr.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    /// Returns the contents as a mutable byte slice.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.ptr.is_null() {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
        }
    }

    /// Reinterprets the contents as a slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the length is not a multiple of `size_of::<T>()` or the
    /// allocation is not sufficiently aligned for `T`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        bytemuck::cast_slice(self.as_bytes())
    }
}

impl OwningBuffer {
    fn allocate_impl(size: usize, alignment: usize, zeroed: bool) -> Result<OwningBuffer> {
        verify_arg!(alignment, alignment.is_power_of_two());
        if size == 0 {
            return Ok(OwningBuffer {
                ptr: std::ptr::null_mut(),
                len: 0,
                alignment,
            });
        }
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|_| Error::capacity_overflow(format!("{size} bytes")))?;
        let ptr = unsafe {
            if zeroed {
                alloc_zeroed(layout)
            } else {
                alloc(layout)
            }
        };
        if ptr.is_null() {
            return Err(Error::out_of_memory(size));
        }
        Ok(OwningBuffer {
            ptr,
            len: size,
            alignment,
        })
    }
}

impl Drop for OwningBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for OwningBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for OwningBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl std::ops::DerefMut for OwningBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_bytes_mut()
    }
}

impl AsRef<[u8]> for OwningBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for OwningBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwningBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .finish()
    }
}

// SAFETY: OwningBuffer exclusively owns its allocation and frees it on drop.
unsafe impl Send for OwningBuffer {}

// SAFETY: shared access only hands out immutable views of the allocation.
unsafe impl Sync for OwningBuffer {}
