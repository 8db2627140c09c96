//! A generic, statically-typed facade over `ErasedVec`.
//!
//! `TypedVec<T>` fixes the element width at compile time to `size_of::<T>()`,
//! so the runtime width check of the erased API becomes ordinary type
//! checking and a mismatched item is unrepresentable. The `bytemuck::Pod`
//! bound restricts elements to padding-free, any-bit-pattern types, which is
//! exactly the class for which a byte view of an element is meaningful.

use std::alloc::Layout;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use allocator_api2::alloc::{Allocator, Global};
use bytemuck::Pod;

use crate::{ErasedVec, Error, VacatedBytes};

/// A contiguous growable vector of `T`, backed by the erased engine.
///
/// Zero-sized element types are rejected at construction, mirroring the
/// erased container's nonzero-width requirement.
pub struct TypedVec<T, A: Allocator = Global> {
    raw: ErasedVec<A>,
    _marker: PhantomData<T>,
}

impl<T: Pod> TypedVec<T> {
    /// Creates a vector with room for at least `min_capacity` elements.
    ///
    /// Fails if `T` is zero-sized, the hint is zero, the total byte size
    /// overflows, or allocation fails.
    pub fn with_capacity(min_capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_in(min_capacity, Global)
    }
}

impl<T: Pod, A: Allocator> TypedVec<T, A> {
    /// [`TypedVec::with_capacity`] with an explicit allocator.
    pub fn with_capacity_in(min_capacity: usize, alloc: A) -> Result<Self, Error> {
        let raw = ErasedVec::with_layout_in(min_capacity, Layout::new::<T>(), alloc)?;
        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of elements the vector can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the policy applied to bytes vacated by removal.
    #[inline]
    pub fn vacated_bytes(&self) -> VacatedBytes {
        self.raw.vacated_bytes()
    }

    /// Sets the policy applied to bytes vacated by removal.
    #[inline]
    pub fn set_vacated_bytes(&mut self, policy: VacatedBytes) {
        self.raw.set_vacated_bytes(policy);
    }

    /// Borrows the underlying erased container.
    #[inline]
    pub fn as_erased(&self) -> &ErasedVec<A> {
        &self.raw
    }

    /// Returns the element at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.raw.get(index).map(bytemuck::from_bytes)
    }

    /// Returns the element at `index` mutably, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.raw.get_mut(index).map(bytemuck::from_bytes_mut)
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Appends a value, growing if full.
    pub fn push(&mut self, value: T) -> Result<(), Error> {
        self.raw.push(bytemuck::bytes_of(&value))
    }

    /// Inserts a value at `index`, shifting later elements right.
    ///
    /// The value is taken by copy, so it may originate from this vector's own
    /// elements without any aliasing hazard.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), Error> {
        self.raw.insert(index, bytemuck::bytes_of(&value))
    }

    /// Inserts a copy of the element at `src` into position `index`.
    pub fn insert_from(&mut self, index: usize, src: usize) -> Result<(), Error> {
        self.raw.insert_from(index, src)
    }

    /// Removes and returns the element at `index`, shifting later elements
    /// left.
    pub fn remove(&mut self, index: usize) -> Result<T, Error> {
        let value = *self.get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.len(),
        })?;
        self.raw.remove(index)?;
        Ok(value)
    }

    /// Removes every element equal to `value`. Returns how many were removed.
    pub fn remove_all(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.remove_all_where(|elem| elem == value)
    }

    /// Removes every element satisfying `predicate`, preserving the relative
    /// order of the survivors. Returns how many were removed.
    pub fn remove_all_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.raw
            .remove_all_where(|bytes| predicate(bytemuck::from_bytes(bytes)))
    }

    /// Shortens the vector to at most `new_len` elements.
    pub fn truncate(&mut self, new_len: usize) {
        self.raw.truncate(new_len);
    }

    /// Removes all elements, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Swaps the elements at indices `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        self.raw.swap(a, b)
    }

    /// Returns the index of the first element equal to `value`.
    pub fn position(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|elem| elem == value)
    }

    /// Returns the index of the first element satisfying `predicate`.
    pub fn position_where<F>(&self, mut predicate: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(|elem| predicate(elem))
    }

    /// Returns `true` if some element equals `value`.
    #[inline]
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.position(value).is_some()
    }

    /// Returns `true` if some element satisfies `predicate`.
    #[inline]
    pub fn contains_where<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.position_where(predicate).is_some()
    }

    /// Sorts the elements according to `cmp`. Unstable.
    pub fn sort_unstable_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.raw
            .sort_unstable_by(|a, b| cmp(bytemuck::from_bytes(a), bytemuck::from_bytes(b)));
    }

    /// Sorts the elements in ascending order. Unstable.
    pub fn sort_unstable(&mut self)
    where
        T: Ord,
    {
        self.sort_unstable_by(T::cmp);
    }

    /// Applies `f` to each element in order, stopping at the first `Err` and
    /// propagating it. `f` may rewrite elements in place.
    pub fn apply<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut T) -> Result<(), E>,
    {
        self.raw.apply(|bytes| f(bytemuck::from_bytes_mut(bytes)))
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.raw.iter().map(bytemuck::from_bytes)
    }

    /// Returns an iterator over the elements with mutable access.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator {
        self.raw.iter_mut().map(bytemuck::from_bytes_mut)
    }
}

impl<T, A1, A2> PartialEq<TypedVec<T, A2>> for TypedVec<T, A1>
where
    T: Pod + PartialEq,
    A1: Allocator,
    A2: Allocator,
{
    fn eq(&self, other: &TypedVec<T, A2>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Pod + Eq, A: Allocator> Eq for TypedVec<T, A> {}

impl<T: Pod + fmt::Debug, A: Allocator> fmt::Debug for TypedVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Pod, A: Allocator + Clone> Clone for TypedVec<T, A> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn vec_of(values: &[u64]) -> TypedVec<u64> {
        let mut vec = TypedVec::with_capacity(values.len().max(1)).unwrap();
        for &n in values {
            vec.push(n).unwrap();
        }
        vec
    }

    fn contents(vec: &TypedVec<u64>) -> Vec<u64> {
        vec.iter().copied().collect()
    }

    #[test]
    fn zero_sized_elements_rejected() {
        assert_eq!(
            TypedVec::<()>::with_capacity(4).unwrap_err(),
            Error::ZeroWidth
        );
    }

    #[test]
    fn push_get_and_len() {
        let vec = vec_of(&[10, 20, 30]);
        assert_eq!(vec.len(), 3);
        assert_eq!(vec.get(1), Some(&20));
        assert_eq!(vec.get(3), None);
        assert_eq!(vec.first(), Some(&10));
        assert_eq!(vec.last(), Some(&30));
    }

    #[test]
    fn insert_taken_by_copy_can_come_from_self() {
        let mut vec = vec_of(&[9, 8, 7, 6, 5]);
        // The aliasing hazard of the erased design disappears: the value is
        // copied out before the call.
        let head = *vec.get(0).unwrap();
        vec.insert(1, head).unwrap();
        assert_eq!(contents(&vec), vec![9, 9, 8, 7, 6, 5]);
    }

    #[test]
    fn insert_from_matches_erased_semantics() {
        let mut vec = vec_of(&[9, 8, 7, 6, 5]);
        vec.insert_from(5, 4).unwrap();
        assert_eq!(contents(&vec), vec![9, 8, 7, 6, 5, 5]);
    }

    #[test]
    fn remove_returns_value() {
        let mut vec = vec_of(&[1, 2, 3]);
        assert_eq!(vec.remove(1).unwrap(), 2);
        assert_eq!(contents(&vec), vec![1, 3]);
        assert_eq!(
            vec.remove(5).unwrap_err(),
            Error::OutOfBounds { index: 5, len: 2 }
        );
    }

    #[test]
    fn remove_all_and_order() {
        let mut vec = vec_of(&[4, 4, 1, 4, 4, 4, 2, 4, 3, 4]);
        assert_eq!(vec.remove_all(&4), 7);
        assert_eq!(contents(&vec), vec![1, 2, 3]);
    }

    #[test]
    fn struct_elements() {
        let mut vec: TypedVec<Point> = TypedVec::with_capacity(2).unwrap();
        vec.push(Point { x: 1, y: 2 }).unwrap();
        vec.push(Point { x: 3, y: 4 }).unwrap();
        assert_eq!(vec.position(&Point { x: 3, y: 4 }), Some(1));
        assert!(vec.contains_where(|p| p.x + p.y == 3));

        vec.apply(|p| {
            p.x *= 10;
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(vec.get(1), Some(&Point { x: 30, y: 4 }));
    }

    #[test]
    fn sort_unstable_orders() {
        let mut vec = vec_of(&[5, 1, 4, 2, 3]);
        vec.sort_unstable();
        assert_eq!(contents(&vec), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn equality_and_clone() {
        let vec = vec_of(&[1, 2, 3]);
        let copy = vec.clone();
        assert_eq!(vec, copy);
        assert_ne!(vec, vec_of(&[1, 2]));
    }

    #[test]
    fn growth_preserves_elements() {
        let mut vec: TypedVec<u64> = TypedVec::with_capacity(1).unwrap();
        let cap = vec.capacity();
        for n in 0..(cap as u64 + 1) {
            vec.push(n).unwrap();
        }
        assert!(vec.capacity() > cap);
        assert_eq!(contents(&vec), (0..=cap as u64).collect::<Vec<_>>());
    }
}
