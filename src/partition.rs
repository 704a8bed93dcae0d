//! Balanced split of `len` elements over `parts` owners.
//!
//! The first `len % parts` owners get one extra element, so any two
//! partitions differ in length by at most one and they cover `0..len` in
//! rank order. Owners past `len` legitimately receive empty partitions.

use std::ops::Range;

/// One owner's contiguous sub-range of the global sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub rank: usize,
    pub start: usize,
    pub len: usize,
}

impl Partition {
    /// Partition owned by `rank` when `len` elements are split over `parts`.
    ///
    /// Computed in O(1) so a node can find its own range without
    /// materialising everybody else's.
    pub fn of(rank: usize, parts: usize, len: usize) -> Self {
        debug_assert!(parts > 0 && rank < parts);
        let base = len / parts;
        let extra = len % parts;
        let start = rank * base + rank.min(extra);
        let len = if rank < extra { base + 1 } else { base };
        Self { rank, start, len }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// All `parts` partitions of `0..len`, ordered by rank.
pub fn split(len: usize, parts: usize) -> Vec<Partition> {
    (0..parts).map(|rank| Partition::of(rank, parts, len)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_balanced(len: usize, parts: usize) {
        let all = split(len, parts);
        assert_eq!(all.len(), parts);
        assert_eq!(all.iter().map(|p| p.len).sum::<usize>(), len);

        let max = all.iter().map(|p| p.len).max().unwrap();
        let min = all.iter().map(|p| p.len).min().unwrap();
        assert!(max - min <= 1, "len={len} parts={parts}");

        let mut next = 0;
        for (rank, p) in all.iter().enumerate() {
            assert_eq!(p.rank, rank);
            assert_eq!(p.start, next);
            next = p.range().end;
        }
        assert_eq!(next, len);
    }

    #[test]
    fn balanced_over_many_shapes() {
        for len in 0..64 {
            for parts in 1..12 {
                check_balanced(len, parts);
            }
        }
        check_balanced(10_000_000, 7);
    }

    #[test]
    fn longer_partitions_come_first() {
        let lens: Vec<usize> = split(10, 4).iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
    }

    #[test]
    fn more_parts_than_elements() {
        let all = split(3, 5);
        assert_eq!(
            all.iter().map(|p| p.len).collect::<Vec<_>>(),
            vec![1, 1, 1, 0, 0]
        );
        assert!(all[4].is_empty());
        assert_eq!(all[4].start, 3);
    }
}
