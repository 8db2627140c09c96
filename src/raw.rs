//! Raw arena allocation management for `ErasedVec`.
//!
//! This module handles low-level memory allocation for the container, similar
//! to how `RawVec` works for `Vec` in the standard library. It manages a single
//! contiguous byte region and its capacity but knows nothing about element
//! count or element layout beyond size and alignment.

use std::alloc::Layout;
use std::ptr::NonNull;

use allocator_api2::alloc::{Allocator, Global};

use crate::Error;

/// Raw byte buffer that handles allocation without element management.
///
/// This is the low-level allocation primitive used by `ErasedVec`. The entire
/// capacity region is kept zero-initialized at the allocator level (fresh
/// allocations and growth both use the zeroing allocator entry points), so the
/// full region is always initialized memory and may be viewed as `[u8]`.
pub(crate) struct RawBuf<A: Allocator = Global> {
    /// Start of the owned byte region.
    ptr: NonNull<u8>,
    /// Size of the owned region in bytes. Always nonzero.
    capacity_bytes: usize,
    /// Alignment the region was allocated with.
    align: usize,
    /// The allocator the region was obtained from.
    alloc: A,
}

impl<A: Allocator> RawBuf<A> {
    /// Allocates a zero-initialized region of `capacity_bytes` bytes aligned to
    /// `align`.
    ///
    /// Fails with [`Error::CapacityOverflow`] if the requested size is not
    /// representable as a [`Layout`], or [`Error::AllocFailed`] if the
    /// allocator refuses the request. `capacity_bytes` must be nonzero and
    /// `align` a power of two; the container checks both before calling.
    pub(crate) fn allocate_in(
        capacity_bytes: usize,
        align: usize,
        alloc: A,
    ) -> Result<Self, Error> {
        debug_assert!(capacity_bytes > 0);
        debug_assert!(align.is_power_of_two());

        let layout = Layout::from_size_align(capacity_bytes, align)
            .map_err(|_| Error::CapacityOverflow)?;

        let ptr = alloc.allocate_zeroed(layout).map_err(|_| Error::AllocFailed {
            bytes: capacity_bytes,
        })?;

        Ok(Self {
            ptr: ptr.cast(),
            capacity_bytes,
            align,
            alloc,
        })
    }

    /// Returns the size of the owned region in bytes.
    #[inline]
    pub(crate) fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Returns the alignment the region was allocated with.
    #[inline]
    pub(crate) fn align(&self) -> usize {
        self.align
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Doubles the byte capacity of the region, relocating it if necessary.
    ///
    /// Existing bytes are carried over unchanged and the newly exposed tail is
    /// zero-initialized. Fails closed: on overflow or allocation failure the
    /// buffer is left exactly as it was.
    pub(crate) fn grow_double(&mut self) -> Result<(), Error> {
        let new_bytes = self
            .capacity_bytes
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow)?;

        let old_layout = self.layout();
        let new_layout = Layout::from_size_align(new_bytes, self.align)
            .map_err(|_| Error::CapacityOverflow)?;

        // SAFETY: `ptr` was allocated by `self.alloc` with `old_layout`, and
        // `new_layout` is strictly larger with the same alignment.
        let ptr = unsafe { self.alloc.grow_zeroed(self.ptr, old_layout, new_layout) }
            .map_err(|_| Error::AllocFailed { bytes: new_bytes })?;

        self.ptr = ptr.cast();
        self.capacity_bytes = new_bytes;
        Ok(())
    }

    /// Views the whole capacity region as a byte slice.
    ///
    /// Sound because the region is zero-initialized on allocation and growth,
    /// so every byte in it is initialized at all times.
    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `capacity_bytes` reads for the lifetime
        // of `self`, and the region is fully initialized.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity_bytes) }
    }

    /// Views the whole capacity region as a mutable byte slice.
    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `bytes`, plus `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity_bytes) }
    }

    #[inline]
    fn layout(&self) -> Layout {
        // SAFETY: the pair was validated by `Layout::from_size_align` when the
        // region was allocated or grown.
        unsafe { Layout::from_size_align_unchecked(self.capacity_bytes, self.align) }
    }
}

impl<A: Allocator> Drop for RawBuf<A> {
    fn drop(&mut self) {
        // SAFETY: `ptr` was allocated by `self.alloc` with this exact layout.
        unsafe {
            self.alloc.deallocate(self.ptr, self.layout());
        }
    }
}

// Safety: RawBuf exclusively owns its allocation; there is no interior
// mutability and no shared state beyond the allocator handle itself.
unsafe impl<A: Allocator + Send> Send for RawBuf<A> {}
unsafe impl<A: Allocator + Sync> Sync for RawBuf<A> {}
