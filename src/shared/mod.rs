//! Shared-memory prefix sum: one array, a fixed-size worker pool.

pub mod barrier;
pub mod blocked;
pub mod tree;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::config::{Schedule, SharedConfig};
use crate::error::Result;

/// Pins pool worker `id` to the core with the same index, if there is one.
fn pin_to_core(id: usize) {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if id < core_ids.len() && core_affinity::set_for_current(core_ids[id]) {
            debug!(worker = id, core = core_ids[id].id, "pinned worker");
        }
    }
}

/// Worker pool sized once from a [`SharedConfig`] and reused for every
/// scan it runs.
pub struct SharedScanner {
    config: SharedConfig,
    pool: ThreadPool,
}

impl SharedScanner {
    pub fn new(config: SharedConfig) -> Result<Self> {
        let pin = config.pin_threads;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|id| format!("scan-pool-{id}"))
            .start_handler(move |id| {
                if pin {
                    pin_to_core(id);
                }
            })
            .build()?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Overwrites `nums` with its inclusive prefix sum.
    pub fn scan(&self, nums: &mut [i64]) -> Result<()> {
        let threads = self.config.threads;
        match self.config.schedule {
            Schedule::Tree => self.pool.install(|| tree::prefix_sum(nums)),
            Schedule::Blocked => self.pool.install(|| blocked::prefix_sum(nums, threads)),
            Schedule::Barrier => barrier::prefix_sum(&self.pool, nums)?,
        }
        info!(
            schedule = self.config.schedule.name(),
            threads,
            len = nums.len(),
            "shared-memory scan complete"
        );
        Ok(())
    }
}

/// One-off scan; builds and drops a pool.
pub fn prefix_sum(config: &SharedConfig, nums: &mut [i64]) -> Result<()> {
    SharedScanner::new(*config)?.scan(nums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle;

    #[test]
    fn every_schedule_scans_the_example() {
        for schedule in [Schedule::Tree, Schedule::Barrier, Schedule::Blocked] {
            let config = SharedConfig::try_new(4, schedule).unwrap();
            let mut nums = vec![1, 2, 3, 4, 5];
            prefix_sum(&config, &mut nums).unwrap();
            assert_eq!(nums, vec![1, 3, 6, 10, 15], "{schedule:?}");
        }
    }

    #[test]
    fn scanner_is_reusable() {
        let scanner = SharedScanner::new(SharedConfig::try_new(2, Schedule::Tree).unwrap()).unwrap();
        for len in [0usize, 1, 9, 16] {
            let data: Vec<i64> = (1..=len as i64).collect();
            let mut nums = data.clone();
            scanner.scan(&mut nums).unwrap();
            assert_eq!(oracle::verify(&data, &nums), Ok(()));
        }
        assert_eq!(scanner.config().threads, 2);
    }

    #[test]
    fn barrier_schedule_reuses_the_pool() {
        let scanner =
            SharedScanner::new(SharedConfig::try_new(3, Schedule::Barrier).unwrap()).unwrap();
        for len in [2usize, 17, 100] {
            let data: Vec<i64> = (0..len as i64).map(|x| 5 - x).collect();
            let mut nums = data.clone();
            scanner.scan(&mut nums).unwrap();
            assert_eq!(oracle::verify(&data, &nums), Ok(()), "len={len}");
        }
        assert_eq!(scanner.pool.current_num_threads(), 3);
    }

    #[test]
    fn pinned_pool_still_scans() {
        let config = SharedConfig::try_new(2, Schedule::Barrier).unwrap().pinned(true);
        let mut nums = vec![3; 10];
        prefix_sum(&config, &mut nums).unwrap();
        assert_eq!(nums[9], 30);
    }
}
