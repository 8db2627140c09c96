//! Iterator implementations for `ErasedVec`.
//!
//! Elements are yielded as fixed-width byte slices, in logical order. The
//! iterators are thin wrappers around exact-chunk slice iterators over the
//! initialized element region.

use std::slice::{ChunksExact, ChunksExactMut};

/// An iterator over the elements of an `ErasedVec`, as `&[u8]` chunks of the
/// container's element width.
pub struct Iter<'a> {
    pub(crate) chunks: ChunksExact<'a, u8>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}

/// An iterator over the elements of an `ErasedVec`, as `&mut [u8]` chunks of
/// the container's element width.
pub struct IterMut<'a> {
    pub(crate) chunks: ChunksExactMut<'a, u8>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = &'a mut [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl DoubleEndedIterator for IterMut<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back()
    }
}

impl ExactSizeIterator for IterMut<'_> {}

impl std::iter::FusedIterator for IterMut<'_> {}
