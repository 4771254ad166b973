use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use tracing::warn;

use super::LogSnapshot;
use super::LogStorage;
use super::PendingTruncation;
use super::PendingTruncations;
use crate::DispatchError;
use crate::GroupId;
use crate::Index;
use crate::Result;
use crate::TruncateLogRequest;

#[derive(Debug, Default)]
struct MemLogState {
    compacted_index: Index,
    /// index -> encoded entry size in bytes
    entries: BTreeMap<Index, u64>,
    size: u64,
    size_trusted: bool,
}

impl MemLogState {
    fn last_index(&self) -> Index {
        self.entries
            .keys()
            .next_back()
            .copied()
            .unwrap_or(self.compacted_index)
    }

    fn bytes_in(
        &self,
        after: Index,
        up_to: Index,
    ) -> u64 {
        if up_to <= after {
            return 0;
        }
        self.entries.range(after + 1..=up_to).map(|(_, bytes)| *bytes).sum()
    }
}

/// In-memory log storage with the same size accounting rules as a real log:
/// the tracked size is incremented on append and may be untrusted until
/// recomputed.
#[derive(Debug)]
pub struct MemLogStorage {
    group_id: GroupId,
    state: RwLock<MemLogState>,
    pending: PendingTruncations,
}

impl MemLogStorage {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            state: RwLock::new(MemLogState {
                size_trusted: true,
                ..Default::default()
            }),
            pending: PendingTruncations::new(),
        }
    }

    /// Appends one entry of `bytes` bytes and returns its index.
    pub fn append(
        &self,
        bytes: u64,
    ) -> Index {
        let mut state = self.state.write();
        let index = state.last_index() + 1;
        state.entries.insert(index, bytes);
        state.size = state.size.saturating_add(bytes);
        index
    }

    pub fn append_many(
        &self,
        count: u64,
        bytes_each: u64,
    ) -> Index {
        let mut last = self.last_index();
        for _ in 0..count {
            last = self.append(bytes_each);
        }
        last
    }

    /// Forgets the tracked size, as happens when a node restarts.
    pub fn mark_size_untrusted(&self) {
        let mut state = self.state.write();
        state.size = 0;
        state.size_trusted = false;
    }

    pub fn pending_truncations(&self) -> &PendingTruncations {
        &self.pending
    }

    /// Receiving-side validation of a truncation command.
    ///
    /// The expected first index must match the log's first index with pending
    /// truncations applied; otherwise another truncation raced with this one.
    pub fn check_truncation(
        &self,
        request: &TruncateLogRequest,
    ) -> Result<()> {
        let state = self.state.read();
        let first_index = self.pending.next_compacted_index(state.compacted_index) + 1;
        if request.expected_first_index != first_index {
            return Err(DispatchError::FirstIndexMismatch {
                group_id: self.group_id,
                expected: request.expected_first_index,
                actual: first_index,
            }
            .into());
        }

        let last_index = state.last_index();
        if request.index <= first_index || request.index > last_index + 1 {
            return Err(DispatchError::IndexOutOfRange {
                group_id: self.group_id,
                index: request.index,
                first_index,
                last_index,
            }
            .into());
        }

        Ok(())
    }

    /// Physically discards the entries of every pending truncation covered by
    /// `durable_index`. Returns the new compacted index.
    pub fn enact_pending_truncations(
        &self,
        durable_index: Index,
    ) -> Index {
        // Drained under the write lock: readers see either the pending
        // truncation or the truncated log, never neither.
        let mut state = self.state.write();
        let enacted = self.pending.take_enacted(durable_index);
        for truncation in enacted {
            if truncation.compacted_index <= state.compacted_index {
                continue;
            }
            let removed = state.bytes_in(state.compacted_index, truncation.compacted_index);
            let keep = state.entries.split_off(&(truncation.compacted_index + 1));
            state.entries = keep;
            state.compacted_index = truncation.compacted_index;
            if removed > state.size {
                warn!(
                    group_id = self.group_id,
                    removed,
                    size = state.size,
                    "log size accounting went negative; marking untrusted"
                );
                state.size = 0;
                state.size_trusted = false;
            } else {
                state.size -= removed;
            }
            debug!(
                group_id = self.group_id,
                compacted_index = state.compacted_index,
                "enacted pending truncation"
            );
        }
        state.compacted_index
    }
}

#[async_trait]
impl LogStorage for MemLogStorage {
    fn size_and_trust(&self) -> (u64, bool) {
        let state = self.state.read();
        (state.size, state.size_trusted)
    }

    async fn recompute_size(&self) -> Result<u64> {
        let mut state = self.state.write();
        let size: u64 = state.entries.values().sum();
        state.size = size;
        state.size_trusted = true;
        Ok(size)
    }

    fn snapshot(&self) -> LogSnapshot {
        let state = self.state.read();
        LogSnapshot {
            size_bytes: self.pending.post_truncation_size(state.size),
            size_trusted: state.size_trusted,
            compacted_index: self.pending.next_compacted_index(state.compacted_index),
            last_index: state.last_index(),
        }
    }

    fn compacted_index(&self) -> Index {
        self.state.read().compacted_index
    }

    fn last_index(&self) -> Index {
        self.state.read().last_index()
    }

    fn next_compacted_index_with_pending(
        &self,
        base: Index,
    ) -> Index {
        self.pending.next_compacted_index(base)
    }

    fn post_pending_truncation_size(
        &self,
        base_size: u64,
    ) -> u64 {
        self.pending.post_truncation_size(base_size)
    }

    fn record_pending_truncation(
        &self,
        compacted_index: Index,
        expected_first_index: Index,
    ) {
        let state = self.state.read();
        let logical_compacted = self.pending.next_compacted_index(state.compacted_index);
        if compacted_index <= logical_compacted {
            debug!(
                group_id = self.group_id,
                compacted_index, logical_compacted, "ignoring truncation that does not advance the log"
            );
            return;
        }
        let log_delta_bytes = state.bytes_in(logical_compacted, compacted_index);
        self.pending.record(PendingTruncation {
            compacted_index,
            expected_first_index,
            log_delta_bytes,
        });
    }
}
