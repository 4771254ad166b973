use std::collections::VecDeque;

use parking_lot::RwLock;
use tracing::trace;

use crate::Index;

/// A truncation that was proposed but whose effect is not durable yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTruncation {
    /// Compacted index after this truncation (last discarded entry)
    pub compacted_index: Index,
    /// First index the proposer expected the log to start at
    pub expected_first_index: Index,
    /// Bytes this truncation removes from the log
    pub log_delta_bytes: u64,
}

/// Proposed-but-not-yet-durable truncations of one log.
///
/// Read concurrently by every decision for the group and mutated after a
/// successful submission or once the applied state becomes durable.
#[derive(Debug, Default)]
pub struct PendingTruncations {
    queue: RwLock<VecDeque<PendingTruncation>>,
}

impl PendingTruncations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        truncation: PendingTruncation,
    ) {
        trace!(?truncation, "record pending truncation");
        self.queue.write().push_back(truncation);
    }

    /// `base` advanced past every pending truncation.
    pub fn next_compacted_index(
        &self,
        base: Index,
    ) -> Index {
        self.queue
            .read()
            .iter()
            .fold(base, |acc, t| acc.max(t.compacted_index))
    }

    /// `size` minus every pending truncation's byte delta, floored at zero.
    pub fn post_truncation_size(
        &self,
        size: u64,
    ) -> u64 {
        self.queue
            .read()
            .iter()
            .fold(size, |acc, t| acc.saturating_sub(t.log_delta_bytes))
    }

    /// Removes and returns the truncations covered by `durable_index`, in
    /// proposal order.
    pub fn take_enacted(
        &self,
        durable_index: Index,
    ) -> Vec<PendingTruncation> {
        let mut queue = self.queue.write();
        let mut enacted = Vec::new();
        while let Some(front) = queue.front() {
            if front.compacted_index > durable_index {
                break;
            }
            if let Some(t) = queue.pop_front() {
                enacted.push(t);
            }
        }
        enacted
    }

    pub fn len(&self) -> usize {
        self.queue.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.read().is_empty()
    }
}
