//! A contiguous, growable vector of fixed-width, type-erased elements.
//!
//! `ErasedVec` stores elements as raw bytes of a caller-chosen width, fixed at
//! creation. Every operation that supplies an item takes it as a byte slice
//! whose length must match the container's element width, which serves as a
//! runtime type check. Elements are stored contiguously in a single owned
//! arena that grows by doubling when full.
//!
//! For callers with a concrete element type, [`TypedVec`] wraps the same
//! engine behind a generic API where the width check becomes compile-time type
//! checking.
//!
//! # Example
//!
//! ```
//! use erased_vec::ErasedVec;
//!
//! let mut vec = ErasedVec::with_capacity(4, 4)?;
//! vec.push(&7u32.to_le_bytes())?;
//! vec.push(&9u32.to_le_bytes())?;
//!
//! assert_eq!(vec.len(), 2);
//! assert_eq!(vec.get(1), Some(&9u32.to_le_bytes()[..]));
//! assert!(vec.contains(&7u32.to_le_bytes()));
//! # Ok::<(), erased_vec::Error>(())
//! ```
//!
//! # Reference invalidation
//!
//! The original design this crate descends from handed out raw element
//! pointers that became stale after any mutation. Here element access borrows
//! the container, so the borrow checker statically rejects holding an element
//! reference across a mutating call; there is no runtime invalidation
//! protocol to get wrong. A consequence is that an inserted value can never
//! alias the container's own storage; to insert a copy of an element already
//! in the container, use [`ErasedVec::insert_from`].

mod iter;
mod raw;
mod sort;
mod typed;

pub use iter::{Iter, IterMut};
pub use typed::TypedVec;

use std::alloc::Layout;
use std::cmp::Ordering;
use std::fmt;

use allocator_api2::alloc::{Allocator, Global};

use raw::RawBuf;

/// The error type for `ErasedVec` operations.
///
/// Every failure leaves the container observably unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The supplied item's byte length does not match the element width the
    /// container was created with.
    #[error("element width mismatch: container holds {expected}-byte elements, item is {got} bytes")]
    WidthMismatch { expected: usize, got: usize },
    /// The index does not denote a valid position for the operation.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    /// A capacity or byte-size computation exceeded the representable range.
    #[error("capacity computation overflowed")]
    CapacityOverflow,
    /// The allocator refused the request.
    #[error("memory allocation of {bytes} bytes failed")]
    AllocFailed { bytes: usize },
    /// Containers of zero-sized elements are not supported.
    #[error("element width must be nonzero")]
    ZeroWidth,
    /// The minimum capacity hint must be nonzero.
    #[error("capacity hint must be nonzero")]
    ZeroCapacity,
}

/// Policy for the bytes vacated when elements are removed or truncated.
///
/// The vacated region is never readable through the public API either way;
/// zeroing it additionally keeps removed element content from lingering in
/// the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VacatedBytes {
    /// Zero vacated bytes after removal and truncation.
    #[default]
    Zeroed,
    /// Leave vacated bytes as they were.
    Untouched,
}

/// A contiguous growable vector of fixed-width, type-erased elements.
///
/// # Invariants
///
/// Elements occupy the byte range `[0, len * element_width)` of the arena,
/// contiguously and in logical order. The arena always holds a whole number
/// of element slots, and `len <= capacity` between calls.
pub struct ErasedVec<A: Allocator = Global> {
    /// Low-level arena allocation management.
    buf: RawBuf<A>,
    /// Byte width of each element. Nonzero, fixed at creation.
    elem_size: usize,
    /// Number of initialized elements.
    len: usize,
    /// What to do with bytes vacated by removal.
    vacated: VacatedBytes,
}

impl ErasedVec<Global> {
    /// Creates a container for elements of `element_width` bytes, with room
    /// for at least `min_capacity` of them before the first reallocation.
    ///
    /// The capacity hint is rounded up to the next power of two to reduce
    /// reallocation frequency, so the actual capacity may be up to about twice
    /// the hint.
    ///
    /// Fails if the hint or width is zero, if the total byte size overflows,
    /// or if allocation fails.
    pub fn with_capacity(min_capacity: usize, element_width: usize) -> Result<Self, Error> {
        Self::with_capacity_in(min_capacity, element_width, Global)
    }

    /// Like [`ErasedVec::with_capacity`], but the element width and alignment
    /// are taken from a [`Layout`].
    ///
    /// The width is padded to a multiple of the alignment, and the arena is
    /// allocated at that alignment, so every element slot is suitably aligned
    /// for a type with this layout.
    pub fn with_layout(min_capacity: usize, element: Layout) -> Result<Self, Error> {
        Self::with_layout_in(min_capacity, element, Global)
    }
}

impl<A: Allocator> ErasedVec<A> {
    /// [`ErasedVec::with_capacity`] with an explicit allocator.
    pub fn with_capacity_in(
        min_capacity: usize,
        element_width: usize,
        alloc: A,
    ) -> Result<Self, Error> {
        let element =
            Layout::from_size_align(element_width, 1).map_err(|_| Error::CapacityOverflow)?;
        Self::with_layout_in(min_capacity, element, alloc)
    }

    /// [`ErasedVec::with_layout`] with an explicit allocator.
    pub fn with_layout_in(min_capacity: usize, element: Layout, alloc: A) -> Result<Self, Error> {
        let element = element.pad_to_align();
        if element.size() == 0 {
            return Err(Error::ZeroWidth);
        }
        if min_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        // Round the element capacity up to a power of two, then size the
        // arena; both steps are overflow-checked.
        let capacity = min_capacity
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow)?;
        let bytes = capacity
            .checked_mul(element.size())
            .ok_or(Error::CapacityOverflow)?;

        let buf = RawBuf::allocate_in(bytes, element.align(), alloc)?;
        Ok(Self {
            buf,
            elem_size: element.size(),
            len: 0,
            vacated: VacatedBytes::Zeroed,
        })
    }

    /// Returns the number of elements in the container.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the container can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity_bytes() / self.elem_size
    }

    /// Returns the byte width of the container's elements.
    #[inline]
    pub fn element_width(&self) -> usize {
        self.elem_size
    }

    /// Returns the policy applied to bytes vacated by removal.
    #[inline]
    pub fn vacated_bytes(&self) -> VacatedBytes {
        self.vacated
    }

    /// Sets the policy applied to bytes vacated by removal.
    #[inline]
    pub fn set_vacated_bytes(&mut self, policy: VacatedBytes) {
        self.vacated = policy;
    }

    /// Views the initialized elements as one contiguous byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.bytes()[..self.len * self.elem_size]
    }

    /// Returns the element at `index`, or `None` if out of bounds. O(1).
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index < self.len {
            Some(self.elem(index))
        } else {
            None
        }
    }

    /// Returns the element at `index` mutably, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index < self.len {
            Some(self.elem_mut(index))
        } else {
            None
        }
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&[u8]> {
        self.get(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<&[u8]> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Appends an item to the back of the container, growing if full.
    ///
    /// Amortized O(1); O(n) when growth relocates the arena.
    pub fn push(&mut self, item: &[u8]) -> Result<(), Error> {
        self.check_width(item.len())?;
        if self.len == self.capacity() {
            self.grow()?;
        }

        let start = self.len * self.elem_size;
        self.buf.bytes_mut()[start..start + item.len()].copy_from_slice(item);
        self.len += 1;
        Ok(())
    }

    /// Inserts an item at `index`, shifting the element at that index and all
    /// elements after it one slot to the right.
    ///
    /// `index` may be any position in `[0, len]`; inserting at `len` is
    /// equivalent to [`ErasedVec::push`]. The borrow checker guarantees the
    /// item cannot alias the container's own storage; to insert a copy of an
    /// element already in the container, use [`ErasedVec::insert_from`].
    pub fn insert(&mut self, index: usize, item: &[u8]) -> Result<(), Error> {
        self.check_width(item.len())?;
        if index > self.len {
            return Err(Error::OutOfBounds {
                index,
                len: self.len,
            });
        }
        if self.len == self.capacity() {
            self.grow()?;
        }

        let w = self.elem_size;
        let start = index * w;
        let end = self.len * w;
        let bytes = self.buf.bytes_mut();
        bytes.copy_within(start..end, start + w);
        bytes[start..start + w].copy_from_slice(item);
        self.len += 1;
        Ok(())
    }

    /// Inserts a copy of the container's own element at logical index `src`
    /// into position `index`.
    ///
    /// The outcome is exactly as if the source element's value had been
    /// captured before the operation began: growth happens first, then the
    /// shift, and the source's logical index is adjusted when the shift moved
    /// it, before its bytes are re-read.
    ///
    /// ```
    /// use erased_vec::ErasedVec;
    ///
    /// let mut vec = ErasedVec::with_capacity(8, 4)?;
    /// for n in [9u32, 8, 7, 6, 5] {
    ///     vec.push(&n.to_le_bytes())?;
    /// }
    ///
    /// // Insert a copy of the element at index 0 into index 1.
    /// vec.insert_from(1, 0)?;
    /// assert_eq!(vec.get(1), Some(&9u32.to_le_bytes()[..]));
    /// assert_eq!(vec.len(), 6);
    /// # Ok::<(), erased_vec::Error>(())
    /// ```
    pub fn insert_from(&mut self, index: usize, src: usize) -> Result<(), Error> {
        if src >= self.len {
            return Err(Error::OutOfBounds {
                index: src,
                len: self.len,
            });
        }
        if index > self.len {
            return Err(Error::OutOfBounds {
                index,
                len: self.len,
            });
        }
        if self.len == self.capacity() {
            self.grow()?;
        }

        let w = self.elem_size;
        let start = index * w;
        let end = self.len * w;
        let bytes = self.buf.bytes_mut();
        bytes.copy_within(start..end, start + w);

        // The shift moved the source one slot right when it sat at or after
        // the insertion point.
        let src = if src >= index { src + 1 } else { src };
        bytes.copy_within(src * w..src * w + w, start);
        self.len += 1;
        Ok(())
    }

    /// Removes the element at `index`, shifting all elements after it one
    /// slot left to close the gap.
    ///
    /// Returns the logical index now occupied by the removed element's
    /// successor, which equals the new length when the last element was
    /// removed. The vacated trailing slot is scrubbed per
    /// [`ErasedVec::vacated_bytes`].
    pub fn remove(&mut self, index: usize) -> Result<usize, Error> {
        if index >= self.len {
            return Err(Error::OutOfBounds {
                index,
                len: self.len,
            });
        }

        let w = self.elem_size;
        let start = index * w;
        let end = self.len * w;
        self.buf.bytes_mut().copy_within(start + w..end, start);
        self.len -= 1;
        self.scrub(self.len, 1);
        Ok(index)
    }

    /// Removes every element whose bytes equal `item`. Returns how many were
    /// removed.
    ///
    /// Single linear pass; more efficient than repeated [`ErasedVec::remove`]
    /// calls, which would shift the tail once per removal. Bytewise matching
    /// is unsuitable for element types whose representation can differ for
    /// logically equal values (struct padding, floating point); use
    /// [`ErasedVec::remove_all_where`] for those.
    pub fn remove_all(&mut self, item: &[u8]) -> Result<usize, Error> {
        self.check_width(item.len())?;
        Ok(self.remove_all_where(|elem| elem == item))
    }

    /// Removes every element satisfying `predicate`. Returns how many were
    /// removed.
    ///
    /// Implemented as a single-pass partition: a write cursor trails the scan,
    /// and each element to keep is swapped down to the cursor, so kept
    /// elements end up in `[0, cursor)` in their original relative order with
    /// the removed ones clustered behind them. The tail is then truncated and
    /// scrubbed per [`ErasedVec::vacated_bytes`]. O(n) with at most one swap
    /// per kept element.
    pub fn remove_all_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&[u8]) -> bool,
    {
        if self.len == 0 {
            return 0;
        }

        let len = self.len;
        let mut cursor = 0;
        for i in 0..len {
            let keep = !predicate(self.elem(i));
            if keep {
                if i > cursor {
                    self.swap_unchecked(i, cursor);
                }
                cursor += 1;
            }
        }

        let removed = len - cursor;
        self.len = cursor;
        self.scrub(cursor, removed);
        removed
    }

    /// Shortens the container to at most `new_len` elements, scrubbing the
    /// vacated tail per [`ErasedVec::vacated_bytes`]. No-op if `new_len` is
    /// not smaller than the current length.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let removed = self.len - new_len;
        self.len = new_len;
        self.scrub(new_len, removed);
    }

    /// Removes all elements, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Swaps the elements at logical indices `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        for index in [a, b] {
            if index >= self.len {
                return Err(Error::OutOfBounds {
                    index,
                    len: self.len,
                });
            }
        }
        self.swap_unchecked(a, b);
        Ok(())
    }

    /// Returns the logical index of the first element whose bytes equal
    /// `item`, or `None` if there is no match.
    ///
    /// An item of the wrong width can match nothing and yields `None`. See
    /// the bytewise-matching caveat on [`ErasedVec::remove_all`].
    pub fn position(&self, item: &[u8]) -> Option<usize> {
        if item.len() != self.elem_size {
            return None;
        }
        self.iter().position(|elem| elem == item)
    }

    /// Returns the logical index of the first element satisfying `predicate`,
    /// or `None` if none does.
    pub fn position_where<F>(&self, predicate: F) -> Option<usize>
    where
        F: FnMut(&[u8]) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Returns `true` if some element's bytes equal `item`.
    #[inline]
    pub fn contains(&self, item: &[u8]) -> bool {
        self.position(item).is_some()
    }

    /// Returns `true` if some element satisfies `predicate`.
    #[inline]
    pub fn contains_where<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&[u8]) -> bool,
    {
        self.position_where(predicate).is_some()
    }

    /// Structural equality under a caller-supplied element equivalence.
    ///
    /// Two containers are equal iff they have the same element width and
    /// length and `eq` holds for every corresponding element pair. Two empty
    /// containers of the same width are equal regardless of capacity. For
    /// plain bytewise equality use `==`.
    pub fn eq_by<A2, F>(&self, other: &ErasedVec<A2>, mut eq: F) -> bool
    where
        A2: Allocator,
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.elem_size == other.elem_size
            && self.len == other.len
            && self.iter().zip(other.iter()).all(|(a, b)| eq(a, b))
    }

    /// Sorts the elements according to `cmp`.
    ///
    /// Unstable: the relative order of elements the comparator considers
    /// equal is unspecified. O(n log n) worst case. Sorting an empty
    /// container is a no-op.
    pub fn sort_unstable_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        let w = self.elem_size;
        let live = self.len * w;
        let mut view = sort::ChunkView::new(&mut self.buf.bytes_mut()[..live], w);
        sort::sort_unstable_by(&mut view, &mut cmp);
    }

    /// Applies `f` to each element in logical order, stopping at the first
    /// `Err` and propagating it.
    ///
    /// `f` receives each element mutably and may rewrite it in place. Caller
    /// state threads through the closure's captures, which also makes this
    /// the fold primitive:
    ///
    /// ```
    /// use erased_vec::ErasedVec;
    ///
    /// let mut vec = ErasedVec::with_capacity(4, 4)?;
    /// for n in [1u32, 2, 3] {
    ///     vec.push(&n.to_le_bytes())?;
    /// }
    ///
    /// let mut sum = 0u64;
    /// vec.apply(|elem| {
    ///     sum += u64::from(u32::from_le_bytes(elem.try_into().unwrap()));
    ///     Ok::<(), ()>(())
    /// })
    /// .unwrap();
    /// assert_eq!(sum, 6);
    /// # Ok::<(), erased_vec::Error>(())
    /// ```
    pub fn apply<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut [u8]) -> Result<(), E>,
    {
        for i in 0..self.len {
            f(self.elem_mut(i))?;
        }
        Ok(())
    }

    /// Returns an iterator over the elements as `&[u8]` chunks.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            chunks: self.as_bytes().chunks_exact(self.elem_size),
        }
    }

    /// Returns an iterator over the elements as `&mut [u8]` chunks.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        let w = self.elem_size;
        let live = self.len * w;
        IterMut {
            chunks: self.buf.bytes_mut()[..live].chunks_exact_mut(w),
        }
    }

    #[inline]
    fn elem(&self, index: usize) -> &[u8] {
        debug_assert!(index < self.len);
        let w = self.elem_size;
        &self.buf.bytes()[index * w..(index + 1) * w]
    }

    #[inline]
    fn elem_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(index < self.len);
        let w = self.elem_size;
        &mut self.buf.bytes_mut()[index * w..(index + 1) * w]
    }

    #[inline]
    fn check_width(&self, got: usize) -> Result<(), Error> {
        if got == self.elem_size {
            Ok(())
        } else {
            Err(Error::WidthMismatch {
                expected: self.elem_size,
                got,
            })
        }
    }

    /// Doubles the arena. Only called when the container is exactly full;
    /// failure leaves the container unchanged.
    fn grow(&mut self) -> Result<(), Error> {
        debug_assert_eq!(self.len, self.capacity());
        self.buf.grow_double()
    }

    /// Applies the vacated-bytes policy to `count` element slots starting at
    /// logical index `start`.
    fn scrub(&mut self, start: usize, count: usize) {
        if self.vacated == VacatedBytes::Zeroed && count > 0 {
            let w = self.elem_size;
            self.buf.bytes_mut()[start * w..(start + count) * w].fill(0);
        }
    }

    #[cfg(test)]
    fn arena_bytes(&self) -> &[u8] {
        self.buf.bytes()
    }

    /// Swap without bounds checks on the logical indices.
    fn swap_unchecked(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.elem_size;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.buf.bytes_mut().split_at_mut(hi * w);
        head[lo * w..lo * w + w].swap_with_slice(&mut tail[..w]);
    }
}

impl<A1: Allocator, A2: Allocator> PartialEq<ErasedVec<A2>> for ErasedVec<A1> {
    /// Bytewise structural equality: same element width, same length, same
    /// element bytes. Trailing capacity beyond `len` is never compared.
    fn eq(&self, other: &ErasedVec<A2>) -> bool {
        self.elem_size == other.elem_size
            && self.len == other.len
            && self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> Eq for ErasedVec<A> {}

impl<A: Allocator> fmt::Debug for ErasedVec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedVec")
            .field("element_width", &self.elem_size)
            .field("len", &self.len)
            .field("elements", &DebugElements(self))
            .finish()
    }
}

struct DebugElements<'a, A: Allocator>(&'a ErasedVec<A>);

impl<A: Allocator> fmt::Debug for DebugElements<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<A: Allocator + Clone> Clone for ErasedVec<A> {
    /// Clones the container, preserving capacity, element width, and the
    /// vacated-bytes policy.
    ///
    /// # Panics
    ///
    /// Panics if allocating the new arena fails.
    fn clone(&self) -> Self {
        let buf = RawBuf::allocate_in(
            self.buf.capacity_bytes(),
            self.buf.align(),
            self.buf.allocator().clone(),
        )
        .expect("allocation failed while cloning ErasedVec");

        let mut clone = Self {
            buf,
            elem_size: self.elem_size,
            len: self.len,
            vacated: self.vacated,
        };
        let live = self.len * self.elem_size;
        clone.buf.bytes_mut()[..live].copy_from_slice(self.as_bytes());
        clone
    }
}

impl<'a, A: Allocator> IntoIterator for &'a ErasedVec<A> {
    type Item = &'a [u8];
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, A: Allocator> IntoIterator for &'a mut ErasedVec<A> {
    type Item = &'a mut [u8];
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
