use std::collections::BTreeMap;

use crate::DecisionInput;
use crate::Index;
use crate::PeerId;
use crate::Progress;

pub(crate) struct DecisionInputBuilder {
    input: DecisionInput,
}

impl DecisionInputBuilder {
    pub(crate) fn new() -> Self {
        Self {
            input: DecisionInput {
                group_id: 1,
                committed_index: 0,
                last_index: 0,
                compacted_index: 0,
                log_size_bytes: 0,
                max_log_size_bytes: 1000,
                log_size_trusted: true,
                pending_snapshot_index: 0,
                progress: BTreeMap::new(),
            },
        }
    }

    /// `(compacted, last]` retained, `commit` committed.
    pub(crate) fn log(
        mut self,
        compacted: Index,
        last: Index,
        commit: Index,
    ) -> Self {
        self.input.compacted_index = compacted;
        self.input.last_index = last;
        self.input.committed_index = commit;
        self
    }

    pub(crate) fn size(
        mut self,
        size: u64,
        max: u64,
    ) -> Self {
        self.input.log_size_bytes = size;
        self.input.max_log_size_bytes = max;
        self
    }

    pub(crate) fn untrusted(mut self) -> Self {
        self.input.log_size_trusted = false;
        self
    }

    pub(crate) fn pending_snapshot(
        mut self,
        index: Index,
    ) -> Self {
        self.input.pending_snapshot_index = index;
        self
    }

    pub(crate) fn follower(
        mut self,
        peer_id: PeerId,
        progress: Progress,
    ) -> Self {
        self.input.progress.insert(peer_id, progress);
        self
    }

    pub(crate) fn build(self) -> DecisionInput {
        self.input
    }
}
