//! Inclusive prefix sums of `i64` sequences under two parallel models.
//!
//! - [`distributed`]: partitions live on nodes that share nothing and chain
//!   their totals through messages.
//! - [`shared`]: a worker pool scans one array in place with the
//!   up-sweep/down-sweep tree algorithm.
//!
//! [`local_scan::prefix_sum`] is the sequential baseline, and [`oracle`]
//! checks any result against its input.

pub mod bench;
pub mod config;
pub mod distributed;
pub mod error;
pub mod input;
pub mod local_scan;
pub mod oracle;
pub mod partition;
pub mod shared;

pub use config::{DistributedConfig, Schedule, SharedConfig};
pub use error::{Result, ScanError};
