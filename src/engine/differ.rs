//! Bucket differ: set difference of two in-memory hash sets.

use std::collections::HashSet;
use std::hash::BuildHasher;

use crate::model::HashValue;

/// Hashes present in `left` only and in `right` only.
///
/// Set semantics: multiplicity within a bucket is irrelevant.
#[must_use]
pub fn diff<S: BuildHasher>(
    left: &HashSet<HashValue, S>,
    right: &HashSet<HashValue, S>,
) -> (Vec<HashValue>, Vec<HashValue>) {
    let only_left = left.difference(right).copied().collect();
    let only_right = right.difference(left).copied().collect();
    (only_left, only_right)
}

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    fn set(values: &[u64]) -> HashSet<u64> {
        values.iter().copied().collect()
    }

    fn sorted(mut v: Vec<u64>) -> Vec<u64> {
        v.sort_unstable();
        v
    }

    #[test]
    fn disjoint_sets() {
        let (l, r) = diff(&set(&[1, 2]), &set(&[3]));
        assert_eq!(sorted(l), vec![1, 2]);
        assert_eq!(r, vec![3]);
    }

    #[test]
    fn overlapping_sets() {
        let (l, r) = diff(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(l, vec![1]);
        assert_eq!(sorted(r), vec![4, 5]);
    }

    #[test]
    fn equal_sets_have_no_difference() {
        let (l, r) = diff(&set(&[9, 8, 7]), &set(&[7, 8, 9]));
        assert!(l.is_empty());
        assert!(r.is_empty());
    }

    #[test]
    fn empty_side() {
        let (l, r) = diff(&set(&[]), &set(&[1]));
        assert!(l.is_empty());
        assert_eq!(r, vec![1]);
    }
}
