//! Carry chain: turns per-node local scans into one global scan.
//!
//! Totals travel from rank 0 to rank P-1 one hop at a time. Node `k` can
//! only forward after hearing from node `k - 1`, so the critical path is
//! P message latencies no matter how small the payload is.

use tracing::debug;

use super::comm::{Communicator, Tag};
use crate::error::Result;
use crate::local_scan;

/// What one node learned from the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Carry {
    /// Sum of every partition before this node's. Always 0 on rank 0.
    pub exclusive: i64,
    /// `exclusive` plus this node's own total; the value forwarded onwards.
    pub inclusive: i64,
}

/// Runs this node's step of the chain.
///
/// `local_total` is the node's partition total after its local scan (zero
/// for an empty partition). A single-node run sends and receives nothing.
pub fn propagate<C: Communicator>(comm: &C, local_total: i64) -> Result<Carry> {
    let rank = comm.rank();

    let inclusive = if rank == 0 {
        local_total
    } else {
        let incoming = comm.recv(rank - 1, Tag::Carry)?;
        debug!(rank, incoming, "received carry");
        incoming + local_total
    };

    if rank + 1 < comm.size() {
        comm.send(rank + 1, Tag::Carry, inclusive)?;
        debug!(rank, outgoing = inclusive, "forwarded carry");
    }

    Ok(Carry {
        exclusive: inclusive - local_total,
        inclusive,
    })
}

/// Correction sweep: shifts an already locally scanned partition by the
/// node's exclusive carry. Rank 0 is already globally correct.
pub fn apply(rank: usize, scanned: &mut [i64], carry: Carry) {
    if rank == 0 {
        return;
    }
    local_scan::add_offset(scanned, carry.exclusive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::comm::ChannelComm;
    use std::thread;

    fn chain(totals: Vec<i64>) -> Vec<Carry> {
        let world = ChannelComm::world(totals.len());
        thread::scope(|s| {
            let handles: Vec<_> = world
                .into_iter()
                .zip(totals)
                .map(|(comm, total)| s.spawn(move || propagate(&comm, total).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn carries_are_exclusive_prefix_of_totals() {
        let carries = chain(vec![3, 0, 7, -2, 5]);
        let exclusive: Vec<i64> = carries.iter().map(|c| c.exclusive).collect();
        let inclusive: Vec<i64> = carries.iter().map(|c| c.inclusive).collect();
        assert_eq!(exclusive, vec![0, 3, 3, 10, 8]);
        assert_eq!(inclusive, vec![3, 3, 10, 8, 13]);
    }

    #[test]
    fn single_node_never_communicates() {
        let world = ChannelComm::world(1);
        let carry = propagate(&world[0], 42).unwrap();
        assert_eq!(carry, Carry { exclusive: 0, inclusive: 42 });
        assert_eq!(world[0].stats().sent, 0);
        assert_eq!(world[0].stats().received, 0);
    }

    #[test]
    fn correction_skips_rank_zero() {
        let carry = Carry { exclusive: 5, inclusive: 8 };
        let mut first = vec![1, 3];
        apply(0, &mut first, carry);
        assert_eq!(first, vec![1, 3]);

        let mut later = vec![1, 3];
        apply(2, &mut later, carry);
        assert_eq!(later, vec![6, 8]);
    }
}
