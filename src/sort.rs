//! Sorting for `ErasedVec`.
//!
//! Comparison sorts adapted from the Rust standard library's unstable sort to
//! work on type-erased, fixed-width element chunks instead of `&mut [T]`. The
//! comparator sees elements as byte slices; element moves are whole-chunk
//! swaps.

use std::cmp::Ordering;

/// Threshold for switching to insertion sort.
const INSERTION_SORT_THRESHOLD: usize = 20;

/// A mutable view of erased elements addressable by logical index.
///
/// This is the seam between the sort algorithms and the container's byte
/// storage: `data` covers exactly the initialized element region and `width`
/// is the fixed element size.
pub(crate) struct ChunkView<'a> {
    data: &'a mut [u8],
    width: usize,
}

impl<'a> ChunkView<'a> {
    /// `data.len()` must be a multiple of `width`.
    pub(crate) fn new(data: &'a mut [u8], width: usize) -> Self {
        debug_assert!(width > 0);
        debug_assert_eq!(data.len() % width, 0);
        Self { data, width }
    }

    /// Number of elements in the view.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len() / self.width
    }

    /// Borrows the element at `index`.
    #[inline]
    pub(crate) fn chunk(&self, index: usize) -> &[u8] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    /// Swaps the elements at `a` and `b` chunk-wise.
    #[inline]
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.width;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * w);
        head[lo * w..lo * w + w].swap_with_slice(&mut tail[..w]);
    }
}

/// Sorts the whole view with an unstable comparison sort.
///
/// Quicksort with median-of-three pivot selection, insertion sort for short
/// runs, and a heapsort fallback once the recursion budget is spent, which
/// bounds the worst case at O(n log n).
pub(crate) fn sort_unstable_by<F>(v: &mut ChunkView<'_>, cmp: &mut F)
where
    F: FnMut(&[u8], &[u8]) -> Ordering,
{
    let len = v.len();
    let mut is_less = |a: &[u8], b: &[u8]| cmp(a, b) == Ordering::Less;
    quicksort(v, 0, len, &mut is_less);
}

/// Sorts `v[start..end]` using insertion sort.
fn insertion_sort<F>(v: &mut ChunkView<'_>, start: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    for i in (start + 1)..end {
        // Insert v[i] into the sorted sequence v[start..i].
        let mut j = i;
        while j > start && is_less(v.chunk(j), v.chunk(j - 1)) {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Sorts `v[start..end]` using heapsort. Guarantees O(n log n) worst-case.
fn heapsort<F>(v: &mut ChunkView<'_>, start: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    let len = end - start;
    if len < 2 {
        return;
    }

    // Build the heap in-place.
    for i in (0..len / 2).rev() {
        sift_down(v, start, i, len, is_less);
    }

    // Pop elements from the heap one by one.
    for i in (1..len).rev() {
        v.swap(start, start + i);
        sift_down(v, start, 0, i, is_less);
    }
}

/// Sift down element at `node` in the heap rooted at `start` with `heap_size`
/// elements.
fn sift_down<F>(
    v: &mut ChunkView<'_>,
    start: usize,
    mut node: usize,
    heap_size: usize,
    is_less: &mut F,
) where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    loop {
        let mut child = 2 * node + 1;
        if child >= heap_size {
            break;
        }

        // Choose the greater child.
        if child + 1 < heap_size && is_less(v.chunk(start + child), v.chunk(start + child + 1)) {
            child += 1;
        }

        // Stop if the invariant holds.
        if !is_less(v.chunk(start + node), v.chunk(start + child)) {
            break;
        }

        v.swap(start + node, start + child);
        node = child;
    }
}

/// Quicksort entry point with heapsort fallback.
fn quicksort<F>(v: &mut ChunkView<'_>, start: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    let len = end - start;
    if len < 2 {
        return;
    }

    if len <= INSERTION_SORT_THRESHOLD {
        insertion_sort(v, start, end, is_less);
        return;
    }

    // Limit recursion depth to 2 * log2(len) to guarantee O(n log n)
    // worst-case.
    let limit = 2 * (usize::BITS - len.leading_zeros());
    quicksort_recursive(v, start, end, is_less, limit);
}

fn quicksort_recursive<F>(
    v: &mut ChunkView<'_>,
    start: usize,
    end: usize,
    is_less: &mut F,
    mut limit: u32,
) where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    let mut start = start;
    let mut end = end;

    loop {
        let len = end - start;

        if len <= INSERTION_SORT_THRESHOLD {
            insertion_sort(v, start, end, is_less);
            return;
        }

        // If we've hit the recursion limit, fall back to heapsort.
        if limit == 0 {
            heapsort(v, start, end, is_less);
            return;
        }
        limit -= 1;

        // Choose pivot using median-of-three and move it to the start.
        let mid = start + len / 2;
        let pivot_idx = choose_pivot(v, start, mid, end - 1, is_less);
        v.swap(start, pivot_idx);

        // Partition around the pivot.
        let pivot_final = partition(v, start, end, is_less);

        // Recurse on the smaller partition first to limit stack depth.
        let left_len = pivot_final - start;
        let right_len = end - pivot_final - 1;

        if left_len < right_len {
            quicksort_recursive(v, start, pivot_final, is_less, limit);
            start = pivot_final + 1;
        } else {
            quicksort_recursive(v, pivot_final + 1, end, is_less, limit);
            end = pivot_final;
        }
    }
}

/// Returns the index of the median of the three elements.
fn choose_pivot<F>(v: &ChunkView<'_>, a: usize, b: usize, c: usize, is_less: &mut F) -> usize
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    if is_less(v.chunk(a), v.chunk(b)) {
        if is_less(v.chunk(b), v.chunk(c)) {
            b
        } else if is_less(v.chunk(a), v.chunk(c)) {
            c
        } else {
            a
        }
    } else if is_less(v.chunk(a), v.chunk(c)) {
        a
    } else if is_less(v.chunk(b), v.chunk(c)) {
        c
    } else {
        b
    }
}

/// Hoare partition scheme.
///
/// Partitions `v[start..end]` around the pivot at `v[start]` and returns the
/// final position of the pivot.
fn partition<F>(v: &mut ChunkView<'_>, start: usize, end: usize, is_less: &mut F) -> usize
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    let mut left = start + 1;
    let mut right = end - 1;

    loop {
        // Move left pointer right while elements are less than the pivot.
        while left <= right && is_less(v.chunk(left), v.chunk(start)) {
            left += 1;
        }

        // Move right pointer left while elements are >= the pivot.
        while left <= right && !is_less(v.chunk(right), v.chunk(start)) {
            right -= 1;
        }

        if left > right {
            break;
        }

        v.swap(left, right);
        left += 1;
        right -= 1;
    }

    // Move pivot to its final position.
    v.swap(start, right);
    right
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sort_u32(values: &mut Vec<u32>) {
        let mut bytes: Vec<u8> = values.iter().flat_map(|n| n.to_le_bytes()).collect();
        let mut view = ChunkView::new(&mut bytes, 4);
        sort_unstable_by(&mut view, &mut |a: &[u8], b: &[u8]| {
            let a = u32::from_le_bytes(a.try_into().unwrap());
            let b = u32::from_le_bytes(b.try_into().unwrap());
            a.cmp(&b)
        });
        *values = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();
    }

    #[test]
    fn sorts_small_runs() {
        let mut v = vec![5, 3, 9, 1, 1, 8];
        sort_u32(&mut v);
        assert_eq!(v, vec![1, 1, 3, 5, 8, 9]);
    }

    #[test]
    fn sorts_past_insertion_threshold() {
        let mut v: Vec<u32> = (0..500).map(|i| (i * 7919) % 1000).collect();
        let mut expected = v.clone();
        expected.sort_unstable();
        sort_u32(&mut v);
        assert_eq!(v, expected);
    }

    #[test]
    fn sorts_adversarial_orders() {
        for len in [0usize, 1, 2, 21, 64, 257] {
            let mut ascending: Vec<u32> = (0..len as u32).collect();
            let mut descending: Vec<u32> = (0..len as u32).rev().collect();
            let mut constant: Vec<u32> = vec![7; len];
            let expected: Vec<u32> = (0..len as u32).collect();

            sort_u32(&mut ascending);
            sort_u32(&mut descending);
            sort_u32(&mut constant);

            assert_eq!(ascending, expected);
            assert_eq!(descending, expected);
            assert_eq!(constant, vec![7; len]);
        }
    }

    #[test]
    fn swap_is_chunkwise() {
        let mut bytes = vec![1u8, 2, 3, 4, 5, 6];
        let mut view = ChunkView::new(&mut bytes, 2);
        view.swap(0, 2);
        assert_eq!(bytes, vec![5, 6, 3, 4, 1, 2]);
    }
}
