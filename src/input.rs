//! Input sequences for the benchmarks.

use std::ops::Range;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{try_with_capacity, Result};

const RANDOM_UPPER: i64 = 1 << 31;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Global index + 1.
    #[default]
    Sequential,
    /// Uniform in `[0, 2^31)`.
    Random,
    Ones,
}

/// Generates the elements at global indices `range`.
///
/// Random values come from a generator seeded with `seed` alone, so the
/// same `(range, seed)` always yields the same slice. Nodes pass
/// `seed + rank` and get independent streams.
pub fn generate(pattern: Pattern, range: Range<usize>, seed: u64) -> Result<Vec<i64>> {
    let mut data = try_with_capacity(range.len())?;
    match pattern {
        Pattern::Sequential => data.extend(range.map(|i| i as i64 + 1)),
        Pattern::Ones => data.resize(range.len(), 1),
        Pattern::Random => {
            let mut rng = StdRng::seed_from_u64(seed);
            data.extend(range.map(|_| rng.gen_range(0..RANDOM_UPPER)));
        }
    }
    Ok(data)
}
