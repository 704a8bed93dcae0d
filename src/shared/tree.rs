//! Work-efficient (Blelloch) inclusive scan over one shared array.
//!
//! The array is treated as padded to the next power of two, but padding is
//! never materialised: every level only touches indices below `len`.
//! Each level is one rayon parallel-for. Indices written within a level
//! are disjoint, and the end of the parallel-for is the barrier that makes
//! a level's writes visible to the next one.

use rayon::prelude::*;
use tracing::trace;

/// Pairs per rayon task. Keeps tiny levels from being split into
/// single-element jobs.
const MIN_PAIRS_PER_TASK: usize = 1024;

/// Number of levels in the tree: `ceil(log2(len))`.
pub fn height(len: usize) -> u32 {
    len.next_power_of_two().trailing_zeros()
}

/// Reduction phase. For `step = 2^level`, `level = 1..=height`, every
/// `j = k*step - 1 < len` gets `nums[j] += nums[j - step/2]`.
pub fn up_sweep(nums: &mut [i64]) {
    for level in 1..=height(nums.len()) {
        let step = 1usize << level;
        let half = step / 2;
        trace!(level, step, "up-sweep");
        // Each exact chunk ends at one target index j; a trailing partial
        // chunk has no j below len.
        nums.par_chunks_exact_mut(step)
            .with_min_len(MIN_PAIRS_PER_TASK)
            .for_each(|chunk| chunk[step - 1] += chunk[half - 1]);
    }
}

/// Distribution phase. For `level = height-1 ..= 1`, every
/// `j = step-1, 2*step-1, ...` with `j < len - step/2` gets
/// `nums[j + step/2] += nums[j]`.
pub fn down_sweep(nums: &mut [i64]) {
    for level in (1..height(nums.len())).rev() {
        let step = 1usize << level;
        let half = step / 2;
        trace!(level, step, "down-sweep");
        // Chunks of the tail starting at step-1 begin at each source j and
        // hold its target at offset half when j + half < len.
        let Some(tail) = nums.get_mut(step - 1..) else {
            continue;
        };
        tail.par_chunks_mut(step)
            .with_min_len(MIN_PAIRS_PER_TASK)
            .for_each(|chunk| {
                if chunk.len() > half {
                    chunk[half] += chunk[0];
                }
            });
    }
}

/// In-place inclusive scan on the current rayon pool.
pub fn prefix_sum(nums: &mut [i64]) {
    up_sweep(nums);
    down_sweep(nums);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{local_scan, oracle};

    fn scan(data: &[i64]) -> Vec<i64> {
        let mut nums = data.to_vec();
        prefix_sum(&mut nums);
        nums
    }

    #[test]
    fn tree_height() {
        assert_eq!(height(0), 0);
        assert_eq!(height(1), 0);
        assert_eq!(height(2), 1);
        assert_eq!(height(8), 3);
        assert_eq!(height(10), 4);
    }

    #[test]
    fn example_sequence() {
        assert_eq!(scan(&[1, 2, 3, 4, 5]), vec![1, 3, 6, 10, 15]);
    }

    #[test]
    fn up_sweep_puts_total_at_top_for_powers_of_two() {
        let mut nums: Vec<i64> = (1..=8).collect();
        up_sweep(&mut nums);
        assert_eq!(nums, vec![1, 3, 3, 10, 5, 11, 7, 36]);
    }

    #[test]
    fn power_and_non_power_of_two_sizes() {
        for len in [8usize, 10] {
            let data: Vec<i64> = (1..=len as i64).collect();
            assert_eq!(oracle::verify(&data, &scan(&data)), Ok(()), "len={len}");
        }
    }

    #[test]
    fn every_small_size() {
        for len in 0..130 {
            let data: Vec<i64> = (0..len).map(|i| (i * 7 % 11) - 5).collect();
            let mut expected = data.clone();
            local_scan::prefix_sum(&mut expected);
            assert_eq!(scan(&data), expected, "len={len}");
        }
    }

    #[test]
    fn boundaries() {
        assert!(scan(&[]).is_empty());
        assert_eq!(scan(&[-9]), vec![-9]);
    }
}
