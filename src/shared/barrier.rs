//! The tree scan on a fixed set of pool workers separated by a barrier.
//!
//! One task per pool thread is spawned for the whole scan. Worker `t` of
//! `T` takes every `T`-th target index of a level, then waits on a shared
//! barrier before the next level. The array is viewed as atomics for the
//! duration of the scan; the barrier orders one level's stores before the
//! next level's loads, so relaxed accesses are enough.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Barrier;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::trace;

use super::tree::height;
use crate::error::{try_with_capacity, Result, ScanError};

const NO_PANIC: usize = usize::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Up,
    Down,
}

/// One synchronisation round of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub phase: Phase,
    pub step: usize,
}

/// Every level of an up-sweep followed by a down-sweep over `len` elements.
pub fn levels(len: usize) -> Vec<Level> {
    let h = height(len);
    let up = (1..=h).map(|level| Level {
        phase: Phase::Up,
        step: 1 << level,
    });
    let down = (1..h).rev().map(|level| Level {
        phase: Phase::Down,
        step: 1 << level,
    });
    up.chain(down).collect()
}

/// Worker `id`'s share of one level.
fn sweep(nums: &[AtomicI64], level: Level, id: usize, workers: usize) {
    let Level { phase, step } = level;
    let half = step / 2;
    for k in (id..).step_by(workers) {
        let (dst, src) = match phase {
            Phase::Up => {
                let j = (k + 1) * step - 1;
                (j, j - half)
            }
            Phase::Down => {
                let j = step - 1 + k * step;
                (j + half, j)
            }
        };
        if dst >= nums.len() {
            break;
        }
        let sum = nums[dst].load(Ordering::Relaxed) + nums[src].load(Ordering::Relaxed);
        nums[dst].store(sum, Ordering::Relaxed);
    }
}

/// Runs `work(id, level)` for every worker of `pool` and every level, with
/// a barrier after each level.
///
/// The pool must not be running anything else: each worker blocks in the
/// barrier until all of them arrive. A worker that panics skips its
/// remaining work but keeps meeting the barrier, so the others still finish.
pub fn run_levels<W>(pool: &ThreadPool, levels: &[Level], work: W) -> Result<()>
where
    W: Fn(usize, Level) + Sync,
{
    let workers = pool.current_num_threads();
    let barrier = Barrier::new(workers);
    let panicked = AtomicUsize::new(NO_PANIC);
    let (barrier, panicked, work) = (&barrier, &panicked, &work);

    pool.install(|| {
        rayon::scope(|s| {
            for id in 0..workers {
                s.spawn(move |_| {
                    for &level in levels {
                        if panicked.load(Ordering::Relaxed) == NO_PANIC {
                            let done = panic::catch_unwind(AssertUnwindSafe(|| work(id, level)));
                            if done.is_err() {
                                let _ = panicked.compare_exchange(
                                    NO_PANIC,
                                    id,
                                    Ordering::SeqCst,
                                    Ordering::SeqCst,
                                );
                            }
                        }
                        trace!(worker = id, ?level, "level done");
                        barrier.wait();
                    }
                });
            }
        });
    });

    match panicked.load(Ordering::SeqCst) {
        NO_PANIC => Ok(()),
        id => Err(ScanError::WorkerPanicked(id)),
    }
}

/// In-place inclusive scan on every worker of `pool`.
pub fn prefix_sum(pool: &ThreadPool, nums: &mut [i64]) -> Result<()> {
    let levels = levels(nums.len());
    if levels.is_empty() {
        return Ok(());
    }

    let mut cells: Vec<AtomicI64> = try_with_capacity(nums.len())?;
    pool.install(|| cells.par_extend(nums.par_iter().map(|&x| AtomicI64::new(x))));

    let workers = pool.current_num_threads();
    let view = &cells[..];
    run_levels(pool, &levels, |id, level| sweep(view, level, id, workers))?;

    pool.install(|| {
        nums.par_iter_mut()
            .zip(cells.into_par_iter())
            .for_each(|(x, cell)| *x = cell.into_inner());
    });
    Ok(())
}
