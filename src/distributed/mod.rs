//! Message-passing prefix sum.
//!
//! Every node owns one contiguous partition and runs the same program:
//! local scan, one step of the carry chain, correction sweep. Nodes are
//! threads that own their partition outright and talk only through a
//! [`Communicator`].

pub mod carry;
pub mod comm;

use std::thread;

use tracing::{debug, info};

use crate::config::DistributedConfig;
use crate::error::{try_to_vec, try_with_capacity, Result, ScanError};
use crate::local_scan;
use crate::partition::Partition;

pub use carry::Carry;
pub use comm::{ChannelComm, Communicator, MessageStats, Tag};

/// Scans this node's partition in place, leaving it globally correct.
///
/// Blocks until the node's predecessor has forwarded its carry.
pub fn prefix_sum<C: Communicator>(comm: &C, data: &mut [i64]) -> Result<Carry> {
    let rank = comm.rank();
    let local_total = local_scan::prefix_sum(data);
    debug!(rank, len = data.len(), local_total, "local scan done");

    let carry = carry::propagate(comm, local_total)?;
    carry::apply(rank, data, carry);
    debug!(rank, exclusive = carry.exclusive, "partition corrected");
    Ok(carry)
}

/// Sum of the whole sequence, known to every node once the chain has run.
/// The last node is the only one that holds it, so it broadcasts.
pub fn global_total<C: Communicator>(comm: &C, carry: Carry) -> Result<i64> {
    comm.broadcast(comm.size() - 1, carry.inclusive)
}

/// Starts `nodes` node threads connected by a fresh [`ChannelComm`] world
/// and collects their results in rank order.
pub fn launch<T, F>(nodes: usize, node_main: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&ChannelComm) -> Result<T> + Sync,
{
    let world = ChannelComm::world(nodes);
    let node_main = &node_main;

    thread::scope(|s| {
        let handles = world
            .into_iter()
            .map(|comm| {
                thread::Builder::new()
                    .name(format!("node-{}", comm.rank()))
                    .spawn_scoped(s, move || node_main(&comm))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        // Join every node before looking at any result.
        let results: Vec<Result<T>> = handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(ScanError::NodePanicked(rank)))
            })
            .collect();
        root_cause(results)
    })
}

/// Collects node results in rank order. A failed node makes its peers
/// fail with `PeerDisconnected`, so any other error is reported first.
fn root_cause<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut values = Vec::with_capacity(results.len());
    let mut disconnected = None;
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(e @ ScanError::PeerDisconnected { .. }) => {
                disconnected.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    match disconnected {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

/// Per-node result of a distributed run.
#[derive(Clone, Debug)]
pub struct NodeOutcome {
    pub partition: Partition,
    pub scan: Vec<i64>,
    pub carry: Carry,
    /// Sum of the entire sequence.
    pub total: i64,
    pub stats: MessageStats,
}

/// Scatters `data` over `config.nodes` nodes and scans it.
///
/// Each node copies out only its own partition before the run starts.
pub fn run_nodes(config: &DistributedConfig, data: &[i64]) -> Result<Vec<NodeOutcome>> {
    let nodes = config.nodes;
    let outcomes = launch(nodes, |comm| {
        let partition = Partition::of(comm.rank(), nodes, data.len());
        let mut scan = try_to_vec(&data[partition.range()])?;

        comm.barrier()?;
        let carry = prefix_sum(comm, &mut scan)?;
        let total = global_total(comm, carry)?;

        Ok(NodeOutcome {
            partition,
            scan,
            carry,
            total,
            stats: comm.stats(),
        })
    })?;

    info!(nodes, len = data.len(), "distributed scan complete");
    Ok(outcomes)
}

/// Concatenates node partitions back into one sequence.
pub fn gather(outcomes: &[NodeOutcome]) -> Result<Vec<i64>> {
    let len = outcomes.iter().map(|o| o.scan.len()).sum();
    let mut out = try_with_capacity(len)?;
    for outcome in outcomes {
        out.extend_from_slice(&outcome.scan);
    }
    Ok(out)
}

/// Scans `data` with the message-passing model and returns the result.
pub fn run(config: &DistributedConfig, data: &[i64]) -> Result<Vec<i64>> {
    gather(&run_nodes(config, data)?)
}
