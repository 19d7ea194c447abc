//! Append-only buffer of fixed-size elements with amortized growth.
//!
//! `GrowableBuffer<T>` assembles arrays of unknown final length (for example the
//! vertex and index arrays of an imported model) on top of an [`OwningBuffer`].
//! Writing is a two-step protocol: [`get_buffer_to_write`](GrowableBuffer::get_buffer_to_write)
//! reserves room for `count` more elements and returns the first unwritten slot,
//! then [`advance`](GrowableBuffer::advance) commits what was written.
//!
//! Growth allocates a new backing buffer of at least twice the current byte
//! capacity, copies only the written prefix and releases the old allocation,
//! so `N` sequential appends cost `O(N)` copying in total.

use std::marker::PhantomData;

use edc_common::{Result, error::Error};

use crate::owning::OwningBuffer;

pub struct GrowableBuffer<T> {
    buf: OwningBuffer,
    /// Number of committed elements.
    count: usize,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> GrowableBuffer<T> {
    const ELEMENT_SIZE: usize = {
        assert!(std::mem::size_of::<T>() != 0, "zero-sized elements");
        std::mem::size_of::<T>()
    };

    /// Smallest byte capacity a growing buffer allocates.
    const MIN_BYTE_CAPACITY: usize = 4;

    /// Largest byte capacity representable for `T`: the greatest multiple of the
    /// element size that a single allocation layout can describe.
    const MAX_BYTE_CAPACITY: usize =
        isize::MAX as usize - (isize::MAX as usize % Self::ELEMENT_SIZE);

    /// Creates an empty buffer without allocating.
    pub fn new() -> GrowableBuffer<T> {
        let _ = Self::ELEMENT_SIZE;
        GrowableBuffer {
            buf: OwningBuffer::new(),
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Creates a buffer able to hold `capacity` elements without reallocating.
    pub fn with_capacity(capacity: usize) -> Result<GrowableBuffer<T>> {
        let byte_capacity = capacity
            .checked_mul(Self::ELEMENT_SIZE)
            .ok_or_else(|| Error::capacity_overflow(format!("{capacity} elements")))?;
        Ok(GrowableBuffer {
            buf: unsafe { OwningBuffer::allocate_aligned(byte_capacity, Self::alignment())? },
            count: 0,
            _marker: PhantomData,
        })
    }

    /// Number of committed elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of elements the backing allocation can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len() / Self::ELEMENT_SIZE
    }

    /// Byte size of the backing allocation.
    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.buf.len()
    }

    /// Commits `count` reserved elements as written.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without changing the written count if `count`
    /// exceeds the reserved but unwritten capacity.
    ///
    /// # Safety
    ///
    /// The `count` elements following the written prefix must have been
    /// initialized through the pointer returned by
    /// [`get_buffer_to_write`](Self::get_buffer_to_write).
    pub unsafe fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.capacity() - self.count {
            return Err(Error::invalid_arg(
                "count",
                format!(
                    "{count} exceeds the reserved capacity ({} available)",
                    self.capacity() - self.count
                ),
            ));
        }
        self.count += count;
        Ok(())
    }

    /// Ensures room for `count` more elements and returns a pointer to the first
    /// unwritten slot.
    ///
    /// With `zero_cleared`, exactly the `count` exposed elements are zero-filled.
    /// The caller writes through the pointer and then calls [`advance`](Self::advance).
    /// The pointer is invalidated by the next call that may grow the buffer.
    ///
    /// # Errors
    ///
    /// Returns `CapacityOverflow` if `len() + count` elements are not
    /// representable and `OutOfMemory` if the allocation fails.
    #[inline]
    pub fn get_buffer_to_write(&mut self, count: usize, zero_cleared: bool) -> Result<*mut T> {
        if count > self.capacity() - self.count {
            let min_capacity = self
                .count
                .checked_add(count)
                .ok_or_else(|| Error::capacity_overflow(format!("{count} more elements")))?;
            self.resize_buffer(min_capacity)?;
            debug_assert!(count <= self.capacity() - self.count);
        }
        if self.buf.is_empty() {
            return Ok(std::ptr::NonNull::<T>::dangling().as_ptr());
        }
        let p = unsafe { (self.buf.as_mut_ptr() as *mut T).add(self.count) };
        if zero_cleared {
            unsafe {
                std::ptr::write_bytes(p as *mut u8, 0, count * Self::ELEMENT_SIZE);
            }
        }
        Ok(p)
    }

    /// Reserves `count` elements, zero-fills them and returns them as a slice.
    /// The elements are committed with [`advance`](Self::advance).
    pub fn get_zeroed_span(&mut self, count: usize) -> Result<&mut [T]> {
        let p = self.get_buffer_to_write(count, true)?;
        Ok(unsafe { std::slice::from_raw_parts_mut(p, count) })
    }

    /// Appends a single element.
    pub fn push(&mut self, value: T) -> Result<()> {
        let p = self.get_buffer_to_write(1, false)?;
        unsafe {
            p.write(value);
            self.advance(1)
        }
    }

    /// Appends a copy of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        let p = self.get_buffer_to_write(values.len(), false)?;
        unsafe {
            if !values.is_empty() {
                std::ptr::copy_nonoverlapping(values.as_ptr(), p, values.len());
            }
            self.advance(values.len())
        }
    }

    /// Returns a pointer to element 0 together with the written count.
    /// The snapshot is invalidated by the next call that may grow the buffer.
    pub fn get_written_buffer(&self) -> (*const T, usize) {
        (self.buf.as_ptr() as *const T, self.count)
    }

    /// Returns the written elements.
    pub fn written(&self) -> &[T] {
        if self.count == 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr() as *const T, self.count) }
    }

    /// Returns the written elements as mutable.
    pub fn written_mut(&mut self) -> &mut [T] {
        if self.count == 0 {
            return &mut [];
        }
        unsafe { std::slice::from_raw_parts_mut(self.buf.as_mut_ptr() as *mut T, self.count) }
    }

    /// Returns the written elements as bytes.
    pub fn written_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.written())
    }

    /// Releases the backing allocation and resets the written count.
    pub fn release(&mut self) {
        self.buf.release();
        self.count = 0;
    }

    /// Consumes the buffer, returning the backing allocation and the written count.
    pub fn into_inner(mut self) -> (OwningBuffer, usize) {
        let count = self.count;
        (self.buf.take(), count)
    }
}

impl<T: bytemuck::Pod> GrowableBuffer<T> {
    fn alignment() -> usize {
        std::mem::align_of::<T>().max(OwningBuffer::DEFAULT_ALIGNMENT)
    }

    #[cold]
    #[inline(never)]
    fn resize_buffer(&mut self, min_capacity: usize) -> Result<()> {
        let min_byte_capacity = min_capacity
            .checked_mul(Self::ELEMENT_SIZE)
            .filter(|&n| n <= Self::MAX_BYTE_CAPACITY)
            .ok_or_else(|| {
                Error::capacity_overflow(format!(
                    "{min_capacity} elements of {} bytes",
                    Self::ELEMENT_SIZE
                ))
            })?;

        let current = self.buf.len();
        if current == Self::MAX_BYTE_CAPACITY {
            return Err(Error::capacity_overflow("buffer is at its maximum capacity"));
        }
        let new_byte_capacity = if current >= Self::MAX_BYTE_CAPACITY / 2 {
            Self::MAX_BYTE_CAPACITY
        } else {
            Self::MIN_BYTE_CAPACITY
                .max(min_byte_capacity)
                .max(current * 2)
        };
        if new_byte_capacity < min_byte_capacity {
            return Err(Error::capacity_overflow("required capacity is too large"));
        }

        let mut new_buf =
            unsafe { OwningBuffer::allocate_aligned(new_byte_capacity, Self::alignment())? };
        let written_bytes = self.count * Self::ELEMENT_SIZE;
        if written_bytes != 0 {
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.buf.as_ptr(),
                    new_buf.as_mut_ptr(),
                    written_bytes,
                );
            }
        }
        log::trace!(
            "GrowableBuffer: {current} -> {new_byte_capacity} bytes ({written_bytes} written)"
        );
        self.buf.release();
        self.buf = new_buf;
        Ok(())
    }
}

impl<T: bytemuck::Pod> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: bytemuck::Pod + std::fmt::Debug> std::fmt::Debug for GrowableBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("len", &self.count)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
