//! Message passing between nodes that share no memory.
//!
//! [`Communicator`] is the only way a node learns anything about its peers.
//! [`ChannelComm`] implements it over one crossbeam channel per ordered pair
//! of ranks, so messages between two nodes arrive in the order they were
//! sent, like MPI point-to-point traffic on a single tag.

use std::cell::Cell;

use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;

use crate::error::{Result, ScanError};

/// What a message is for. A receiver that gets the wrong kind has hit a
/// protocol violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Carry,
    Broadcast,
    /// Arrival at a barrier, sent to rank 0.
    Barrier,
    /// Rank 0 letting a node leave a barrier.
    Release,
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Carry => "carry",
            Tag::Broadcast => "broadcast",
            Tag::Barrier => "barrier",
            Tag::Release => "release",
        }
    }
}

/// Point-to-point traffic counters for one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub sent: usize,
    pub received: usize,
}

pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Sends one scalar to `to`. Does not wait for the receiver.
    fn send(&self, to: usize, tag: Tag, value: i64) -> Result<()>;

    /// Blocks until the next message from `from` arrives.
    fn recv(&self, from: usize, tag: Tag) -> Result<i64>;

    /// Blocks until every node has called `barrier`.
    ///
    /// Every node reports to rank 0, which releases them once all have
    /// arrived. A node that leaves the run instead of arriving makes the
    /// barrier fail with [`ScanError::PeerDisconnected`] rather than wait.
    fn barrier(&self) -> Result<()> {
        let rank = self.rank();
        if rank != 0 {
            self.send(0, Tag::Barrier, 0)?;
            self.recv(0, Tag::Release)?;
            return Ok(());
        }
        for peer in 1..self.size() {
            self.recv(peer, Tag::Barrier)?;
        }
        for peer in 1..self.size() {
            self.send(peer, Tag::Release, 0)?;
        }
        Ok(())
    }

    /// Distributes `value` from `root` to every node and returns it.
    /// Only the root's `value` matters.
    fn broadcast(&self, root: usize, value: i64) -> Result<i64> {
        if root >= self.size() {
            return Err(ScanError::RankOutOfRange {
                rank: root,
                size: self.size(),
            });
        }
        if self.rank() != root {
            return self.recv(root, Tag::Broadcast);
        }
        for peer in (0..self.size()).filter(|&peer| peer != root) {
            self.send(peer, Tag::Broadcast, value)?;
        }
        Ok(value)
    }
}

struct Envelope {
    tag: Tag,
    value: i64,
}

/// In-process communicator: one per node thread.
pub struct ChannelComm {
    rank: usize,
    size: usize,
    /// `outbox[dst]` carries messages from this node to `dst`.
    outbox: Vec<Sender<Envelope>>,
    /// `inbox[src]` holds messages from `src` to this node.
    inbox: Vec<Receiver<Envelope>>,
    sent: Cell<usize>,
    received: Cell<usize>,
}

impl ChannelComm {
    /// Creates a fully connected set of `size` communicators, indexed by rank.
    pub fn world(size: usize) -> Vec<ChannelComm> {
        let mut outboxes: Vec<Vec<Sender<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Receiver<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for outbox in outboxes.iter_mut() {
            for inbox in inboxes.iter_mut() {
                let (tx, rx) = channel::unbounded();
                outbox.push(tx);
                inbox.push(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outbox, inbox))| ChannelComm {
                rank,
                size,
                outbox,
                inbox,
                sent: Cell::new(0),
                received: Cell::new(0),
            })
            .collect()
    }

    pub fn stats(&self) -> MessageStats {
        MessageStats {
            sent: self.sent.get(),
            received: self.received.get(),
        }
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        if rank < self.size {
            Ok(())
        } else {
            Err(ScanError::RankOutOfRange {
                rank,
                size: self.size,
            })
        }
    }
}

impl Communicator for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, to: usize, tag: Tag, value: i64) -> Result<()> {
        self.check_rank(to)?;
        self.outbox[to]
            .send(Envelope { tag, value })
            .map_err(|_| ScanError::PeerDisconnected {
                rank: self.rank,
                peer: to,
            })?;
        self.sent.set(self.sent.get() + 1);
        Ok(())
    }

    fn recv(&self, from: usize, tag: Tag) -> Result<i64> {
        self.check_rank(from)?;
        let envelope = self.inbox[from]
            .recv()
            .map_err(|_| ScanError::PeerDisconnected {
                rank: self.rank,
                peer: from,
            })?;
        self.received.set(self.received.get() + 1);
        if envelope.tag != tag {
            return Err(ScanError::UnexpectedMessage {
                rank: self.rank,
                from,
                expected: tag.name(),
                actual: envelope.tag.name(),
            });
        }
        Ok(envelope.value)
    }
}
