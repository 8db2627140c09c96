//! Comparison tests between `ErasedVec`/`TypedVec` and `std::Vec`.
//!
//! Property-based testing that applies the same operation sequences to the
//! container under test and to a `Vec<u32>` model, then asserts the two agree,
//! to automatically catch behavioral discrepancies.

use proptest::prelude::*;

use erased_vec::{ErasedVec, TypedVec};

fn le(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

fn from_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().unwrap())
}

fn erased_of(values: &[u32]) -> ErasedVec {
    let mut vec = ErasedVec::with_capacity(values.len().max(1), 4).unwrap();
    for &n in values {
        vec.push(&le(n)).unwrap();
    }
    vec
}

/// Operations applied to both the model and the container under test.
#[derive(Debug, Clone)]
enum VecOp {
    Push(u32),
    Insert(usize, u32),
    InsertFrom(usize, usize),
    Remove(usize),
    RemoveAll(u32),
    RemoveAllWhere(u32),
    Swap(usize, usize),
    Truncate(usize),
    Clear,
    Sort,
}

/// Apply an operation to both vectors, asserting any per-operation results
/// agree. Out-of-range indices are skipped rather than clamped so that the
/// sequences stay meaningful on both sides.
fn apply_op(model: &mut Vec<u32>, vec: &mut ErasedVec, op: &VecOp) {
    match op {
        VecOp::Push(v) => {
            model.push(*v);
            vec.push(&le(*v)).unwrap();
        }
        VecOp::Insert(idx, v) => {
            if *idx <= model.len() {
                model.insert(*idx, *v);
                vec.insert(*idx, &le(*v)).unwrap();
            }
        }
        VecOp::InsertFrom(idx, src) => {
            if *idx <= model.len() && *src < model.len() {
                // The model captures the source value before mutating, which
                // is exactly the contract insert_from promises.
                let value = model[*src];
                model.insert(*idx, value);
                vec.insert_from(*idx, *src).unwrap();
            }
        }
        VecOp::Remove(idx) => {
            if *idx < model.len() {
                model.remove(*idx);
                let successor = vec.remove(*idx).unwrap();
                assert_eq!(successor, *idx, "remove() successor index mismatch");
            }
        }
        VecOp::RemoveAll(v) => {
            let expected = model.iter().filter(|&&n| n == *v).count();
            model.retain(|&n| n != *v);
            let removed = vec.remove_all(&le(*v)).unwrap();
            assert_eq!(removed, expected, "remove_all() count mismatch");
        }
        VecOp::RemoveAllWhere(modulus) => {
            let m = modulus % 5 + 2;
            let expected = model.iter().filter(|&&n| n % m == 0).count();
            model.retain(|&n| n % m != 0);
            let removed = vec.remove_all_where(|e| from_le(e) % m == 0);
            assert_eq!(removed, expected, "remove_all_where() count mismatch");
        }
        VecOp::Swap(a, b) => {
            if *a < model.len() && *b < model.len() {
                model.swap(*a, *b);
                vec.swap(*a, *b).unwrap();
            }
        }
        VecOp::Truncate(len) => {
            model.truncate(*len);
            vec.truncate(*len);
        }
        VecOp::Clear => {
            model.clear();
            vec.clear();
        }
        VecOp::Sort => {
            // u32 ordering is total, so unstable vs. stable is unobservable.
            model.sort_unstable();
            vec.sort_unstable_by(|a, b| from_le(a).cmp(&from_le(b)));
        }
    }
}

/// Verify that the container matches the model exactly.
fn assert_matches_model(model: &[u32], vec: &ErasedVec) {
    assert_eq!(model.len(), vec.len(), "length mismatch");
    assert_eq!(model.is_empty(), vec.is_empty(), "is_empty mismatch");
    assert!(vec.capacity() >= vec.len(), "len exceeds capacity");

    for (i, expected) in model.iter().enumerate() {
        let got = vec.get(i).map(from_le);
        assert_eq!(got, Some(*expected), "element mismatch at index {i}");
    }
    assert_eq!(vec.get(model.len()), None, "get past the end");

    assert_eq!(model.first().copied(), vec.first().map(from_le));
    assert_eq!(model.last().copied(), vec.last().map(from_le));

    let collected: Vec<u32> = vec.iter().map(from_le).collect();
    assert_eq!(model, collected.as_slice(), "iter() mismatch");
}

fn op_strategy() -> impl Strategy<Value = VecOp> {
    // Small value domain so RemoveAll regularly finds duplicates.
    prop_oneof![
        4 => (0u32..16).prop_map(VecOp::Push),
        2 => ((0usize..24), (0u32..16)).prop_map(|(i, v)| VecOp::Insert(i, v)),
        2 => ((0usize..24), (0usize..24)).prop_map(|(i, s)| VecOp::InsertFrom(i, s)),
        2 => (0usize..24).prop_map(VecOp::Remove),
        1 => (0u32..16).prop_map(VecOp::RemoveAll),
        1 => (0u32..16).prop_map(VecOp::RemoveAllWhere),
        1 => ((0usize..24), (0usize..24)).prop_map(|(a, b)| VecOp::Swap(a, b)),
        1 => (0usize..24).prop_map(VecOp::Truncate),
        1 => Just(VecOp::Clear),
        1 => Just(VecOp::Sort),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn operations_match_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut model: Vec<u32> = Vec::new();
        let mut vec = ErasedVec::with_capacity(1, 4).unwrap();

        for op in &ops {
            apply_op(&mut model, &mut vec, op);
            assert_matches_model(&model, &vec);
        }
    }

    #[test]
    fn push_preserves_order_across_growth(values in prop::collection::vec(any::<u32>(), 0..500)) {
        // Start at minimum capacity so the sequence crosses several growths.
        let mut vec = ErasedVec::with_capacity(1, 4).unwrap();
        for &n in &values {
            vec.push(&le(n)).unwrap();
        }
        assert_matches_model(&values, &vec);
    }

    #[test]
    fn position_and_contains_match(
        values in prop::collection::vec(0u32..32, 0..100),
        needle in 0u32..32,
    ) {
        let vec = erased_of(&values);
        assert_eq!(vec.position(&le(needle)), values.iter().position(|&n| n == needle));
        assert_eq!(vec.contains(&le(needle)), values.contains(&needle));
        assert_eq!(
            vec.position_where(|e| from_le(e) > needle),
            values.iter().position(|&n| n > needle),
        );
    }

    #[test]
    fn sort_matches_model(values in prop::collection::vec(any::<u32>(), 0..300)) {
        let mut expected = values.clone();
        expected.sort_unstable();

        let mut vec = erased_of(&values);
        vec.sort_unstable_by(|a, b| from_le(a).cmp(&from_le(b)));
        assert_matches_model(&expected, &vec);
    }

    #[test]
    fn remove_all_where_leaves_no_matches(
        values in prop::collection::vec(0u32..10, 0..200),
        target in 0u32..10,
    ) {
        let mut vec = erased_of(&values);
        let removed = vec.remove_all_where(|e| from_le(e) == target);
        prop_assert_eq!(removed, values.iter().filter(|&&n| n == target).count());
        prop_assert!(!vec.contains_where(|e| from_le(e) == target));

        let survivors: Vec<u32> = values.iter().copied().filter(|&n| n != target).collect();
        assert_matches_model(&survivors, &vec);
    }

    #[test]
    fn equality_matches_model(
        a in prop::collection::vec(0u32..8, 0..40),
        b in prop::collection::vec(0u32..8, 0..40),
    ) {
        let va = erased_of(&a);
        let vb = erased_of(&b);
        prop_assert_eq!(va == vb, a == b);
        prop_assert_eq!(vb == va, a == b);
        prop_assert!(va == va.clone());
        prop_assert_eq!(va.eq_by(&vb, |x, y| x == y), a == b);
    }

    #[test]
    fn apply_folds_like_model(values in prop::collection::vec(any::<u32>(), 0..100)) {
        let mut vec = erased_of(&values);
        let mut sum = 0u64;
        let result = vec.apply(|e| {
            sum += u64::from(from_le(e));
            Ok::<(), ()>(())
        });
        prop_assert_eq!(result, Ok(()));
        prop_assert_eq!(sum, values.iter().map(|&n| u64::from(n)).sum::<u64>());
    }

    #[test]
    fn apply_stops_at_first_failure(
        values in prop::collection::vec(0u32..8, 1..100),
        target in 0u32..8,
    ) {
        let mut vec = erased_of(&values);
        let mut visited = 0usize;
        let result = vec.apply(|e| {
            if from_le(e) == target {
                return Err(visited);
            }
            visited += 1;
            Ok(())
        });

        match values.iter().position(|&n| n == target) {
            Some(stop) => {
                prop_assert_eq!(result, Err(stop));
                prop_assert_eq!(visited, stop);
            }
            None => {
                prop_assert_eq!(result, Ok(()));
                prop_assert_eq!(visited, values.len());
            }
        }
    }

    #[test]
    fn typed_vec_matches_model(values in prop::collection::vec(any::<u64>(), 0..200)) {
        let mut vec: TypedVec<u64> = TypedVec::with_capacity(1).unwrap();
        for &n in &values {
            vec.push(n).unwrap();
        }
        prop_assert_eq!(vec.len(), values.len());
        let collected: Vec<u64> = vec.iter().copied().collect();
        prop_assert_eq!(&collected, &values);

        let mut sorted_model = values.clone();
        sorted_model.sort_unstable();
        vec.sort_unstable();
        let collected: Vec<u64> = vec.iter().copied().collect();
        prop_assert_eq!(collected, sorted_model);
    }

    #[test]
    fn typed_remove_matches_model(
        values in prop::collection::vec(0u64..16, 1..60),
        indices in prop::collection::vec(0usize..60, 0..30),
    ) {
        let mut model = values.clone();
        let mut vec: TypedVec<u64> = TypedVec::with_capacity(values.len()).unwrap();
        for &n in &values {
            vec.push(n).unwrap();
        }

        for &idx in &indices {
            if idx < model.len() {
                let expected = model.remove(idx);
                prop_assert_eq!(vec.remove(idx).unwrap(), expected);
            }
        }
        let collected: Vec<u64> = vec.iter().copied().collect();
        prop_assert_eq!(collected, model);
    }
}
