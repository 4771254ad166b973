use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::FollowerActivity;
use crate::GroupId;
use crate::Index;
use crate::LivenessOracle;
use crate::LogStorage;
use crate::MemLogStorage;
use crate::PeerId;
use crate::Progress;
use crate::RaftGroup;
use crate::RaftRole;
use crate::RaftStatus;

/// In-memory group handle whose consensus state is set directly by tests.
pub(crate) struct FakeGroup<S: LogStorage = MemLogStorage> {
    group_id: GroupId,
    storage: Arc<S>,
    status: RwLock<Option<RaftStatus>>,
    members: RwLock<Vec<PeerId>>,
    transfer_target: RwLock<Option<Index>>,
    activity: FollowerActivity,
    max_log_size_override: Option<u64>,
}

impl FakeGroup<MemLogStorage> {
    pub(crate) fn new(group_id: GroupId) -> Self {
        Self::with_storage(group_id, Arc::new(MemLogStorage::new(group_id)))
    }
}

impl<S: LogStorage> FakeGroup<S> {
    pub(crate) fn with_storage(
        group_id: GroupId,
        storage: Arc<S>,
    ) -> Self {
        Self {
            group_id,
            storage,
            status: RwLock::new(None),
            members: RwLock::new(Vec::new()),
            transfer_target: RwLock::new(None),
            activity: FollowerActivity::new(),
            max_log_size_override: None,
        }
    }

    pub(crate) fn with_max_log_size_override(
        mut self,
        max: u64,
    ) -> Self {
        self.max_log_size_override = Some(max);
        self
    }

    pub(crate) fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub(crate) fn activity(&self) -> &FollowerActivity {
        &self.activity
    }

    /// Makes the local replica leader with `progress` as the raw view of the
    /// followers; every peer in `progress` becomes a member.
    pub(crate) fn lead(
        &self,
        commit_index: Index,
        progress: impl IntoIterator<Item = (PeerId, Progress)>,
    ) {
        let progress: BTreeMap<PeerId, Progress> = progress.into_iter().collect();
        *self.members.write() = progress.keys().copied().collect();
        *self.status.write() = Some(RaftStatus {
            role: RaftRole::Leader,
            commit_index,
            progress,
        });
    }

    pub(crate) fn set_status(
        &self,
        status: Option<RaftStatus>,
    ) {
        *self.status.write() = status;
    }

    pub(crate) fn set_members(
        &self,
        members: Vec<PeerId>,
    ) {
        *self.members.write() = members;
    }

    pub(crate) fn set_transfer_target(
        &self,
        index: Option<Index>,
    ) {
        *self.transfer_target.write() = index;
    }
}

impl<S: LogStorage> RaftGroup for FakeGroup<S> {
    fn group_id(&self) -> GroupId {
        self.group_id
    }

    fn log_storage(&self) -> &dyn LogStorage {
        &*self.storage
    }

    fn raft_status(&self) -> Option<RaftStatus> {
        self.status.read().clone()
    }

    fn members(&self) -> Vec<PeerId> {
        self.members.read().clone()
    }

    fn pending_transfer_target(&self) -> Option<Index> {
        *self.transfer_target.read()
    }

    fn liveness(&self) -> &dyn LivenessOracle {
        &self.activity
    }

    fn max_log_size_override(&self) -> Option<u64> {
        self.max_log_size_override
    }
}
