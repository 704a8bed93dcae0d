use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

/// Everything that can stop a scan before it produces a result.
///
/// Configuration errors are raised before any work starts and can be fixed
/// by the caller. The rest abort the run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("sequence length must be non-negative, got {0}")]
    InvalidLength(i64),

    #[error("{what} count must be positive, got {count}")]
    InvalidWorkerCount { what: &'static str, count: i64 },

    #[error("unable to allocate storage for {len} elements")]
    Allocation {
        len: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("rank {rank} is outside the communicator of size {size}")]
    RankOutOfRange { rank: usize, size: usize },

    #[error("node {rank} expected a {expected} message from node {from}, got {actual}")]
    UnexpectedMessage {
        rank: usize,
        from: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("node {rank} lost its link to node {peer}")]
    PeerDisconnected { rank: usize, peer: usize },

    #[error("node {0} panicked")]
    NodePanicked(usize),

    #[error("scan worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ScanError {
    /// Configuration errors are the only ones a caller can recover from by
    /// re-invoking with different parameters.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidLength(_) | ScanError::InvalidWorkerCount { .. }
        )
    }
}

/// Allocates an empty vector able to hold `len` elements without growing.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| ScanError::Allocation { len, source })?;
    Ok(buf)
}

/// Copies `src` into freshly allocated storage.
pub(crate) fn try_to_vec<T: Copy>(src: &[T]) -> Result<Vec<T>> {
    let mut buf = try_with_capacity(src.len())?;
    buf.extend_from_slice(src);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_recoverable() {
        assert!(ScanError::InvalidLength(-1).is_config());
        assert!(ScanError::InvalidWorkerCount {
            what: "node",
            count: 0
        }
        .is_config());
        assert!(!ScanError::NodePanicked(2).is_config());
        assert!(!ScanError::WorkerPanicked(0).is_config());
        assert!(!ScanError::RankOutOfRange { rank: 4, size: 4 }.is_config());
    }

    #[test]
    fn allocation_failure_is_reported() {
        let err = try_with_capacity::<i64>(usize::MAX).unwrap_err();
        assert!(matches!(err, ScanError::Allocation { len: usize::MAX, .. }));
    }

    #[test]
    fn panics_name_the_right_unit() {
        assert_eq!(ScanError::NodePanicked(3).to_string(), "node 3 panicked");
        assert_eq!(ScanError::WorkerPanicked(3).to_string(), "scan worker 3 panicked");
    }

    #[test]
    fn copies_are_exact() {
        let copy = try_to_vec(&[3i64, 1, 4]).unwrap();
        assert_eq!(copy, vec![3, 1, 4]);
    }
}
