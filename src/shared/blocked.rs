//! Scan-then-propagate over one shared array.
//!
//! Same shape as the distributed model, without messages: each worker
//! scans its own balanced block, block totals are chained sequentially into
//! offsets, then every block but the first is shifted in parallel.

use rayon::prelude::*;

use crate::local_scan;
use crate::partition;

/// Splits `nums` into the balanced blocks of [`partition::split`].
fn blocks(nums: &mut [i64], parts: usize) -> Vec<&mut [i64]> {
    let mut rest = nums;
    let mut out = Vec::with_capacity(parts);
    for p in partition::split(rest.len(), parts) {
        let (block, tail) = std::mem::take(&mut rest).split_at_mut(p.len);
        out.push(block);
        rest = tail;
    }
    out
}

/// In-place inclusive scan with one block per worker of the current pool.
pub fn prefix_sum(nums: &mut [i64], parts: usize) {
    let mut blocks = blocks(nums, parts.max(1));

    // local prefix sums in parallel
    let totals: Vec<i64> = blocks
        .par_iter_mut()
        .map(|block| local_scan::prefix_sum(block))
        .collect();

    // exclusive offsets from block totals
    let mut offsets = vec![0i64; totals.len()];
    for i in 1..offsets.len() {
        offsets[i] = offsets[i - 1] + totals[i - 1];
    }

    // add offsets to local sums in parallel
    blocks
        .into_par_iter()
        .zip(offsets)
        .skip(1)
        .for_each(|(block, offset)| local_scan::add_offset(block, offset));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_follow_partitions() {
        let mut nums: Vec<i64> = (0..10).collect();
        let lens: Vec<usize> = blocks(&mut nums, 4).iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
    }

    #[test]
    fn example_sequence() {
        let mut nums = vec![1, 2, 3, 4, 5];
        prefix_sum(&mut nums, 2);
        assert_eq!(nums, vec![1, 3, 6, 10, 15]);
    }

    #[test]
    fn more_blocks_than_elements() {
        let mut nums = vec![2, -1, 4];
        prefix_sum(&mut nums, 8);
        assert_eq!(nums, vec![2, 1, 5]);

        let mut empty: Vec<i64> = Vec::new();
        prefix_sum(&mut empty, 4);
        assert!(empty.is_empty());
    }
}
