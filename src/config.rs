//! Run configuration handed to the scan entry points.
//!
//! The core never reads process arguments. Binaries parse their own command
//! line, own the defaults, and build one of these structs with `try_new`,
//! which rejects bad counts before any work starts.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Result, ScanError};

/// Validates a signed element count coming from the outside world.
pub fn checked_len(num_ints: i64) -> Result<usize> {
    usize::try_from(num_ints).map_err(|_| ScanError::InvalidLength(num_ints))
}

fn checked_count(what: &'static str, count: i64) -> Result<usize> {
    match usize::try_from(count) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ScanError::InvalidWorkerCount { what, count }),
    }
}

/// Settings for the message-passing model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DistributedConfig {
    pub nodes: usize,
}

impl DistributedConfig {
    pub fn try_new(nodes: i64) -> Result<Self> {
        Ok(Self {
            nodes: checked_count("node", nodes)?,
        })
    }
}

/// How the shared-memory model spreads one scan over its worker pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Up-sweep/down-sweep with a work-stealing parallel-for per level.
    #[default]
    Tree,
    /// Up-sweep/down-sweep on persistent workers separated by a barrier.
    Barrier,
    /// Per-thread local scans joined by a carry pass.
    Blocked,
}

impl Schedule {
    pub fn name(&self) -> &'static str {
        match self {
            Schedule::Tree => "tree",
            Schedule::Barrier => "barrier",
            Schedule::Blocked => "blocked",
        }
    }
}

/// Settings for the shared-memory model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SharedConfig {
    pub threads: usize,
    pub schedule: Schedule,
    /// Pin pool workers to cores, one core per worker.
    pub pin_threads: bool,
}

impl SharedConfig {
    pub fn try_new(threads: i64, schedule: Schedule) -> Result<Self> {
        Ok(Self {
            threads: checked_count("thread", threads)?,
            schedule,
            pin_threads: false,
        })
    }

    pub fn pinned(mut self, pin_threads: bool) -> Self {
        self.pin_threads = pin_threads;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_length() {
        assert!(matches!(checked_len(-5), Err(ScanError::InvalidLength(-5))));
        assert_eq!(checked_len(0).unwrap(), 0);
        assert_eq!(checked_len(10).unwrap(), 10);
    }

    #[test]
    fn rejects_non_positive_counts() {
        for bad in [0, -1, i64::MIN] {
            let err = DistributedConfig::try_new(bad).unwrap_err();
            assert!(err.is_config());
            let err = SharedConfig::try_new(bad, Schedule::Tree).unwrap_err();
            assert!(matches!(
                err,
                ScanError::InvalidWorkerCount { what: "thread", .. }
            ));
        }
    }

    #[test]
    fn accepts_valid_counts() {
        assert_eq!(DistributedConfig::try_new(5).unwrap().nodes, 5);
        let shared = SharedConfig::try_new(16, Schedule::Barrier)
            .unwrap()
            .pinned(true);
        assert_eq!(shared.threads, 16);
        assert_eq!(shared.schedule, Schedule::Barrier);
        assert!(shared.pin_threads);
    }
}
