//! Leader-side view of a raft group: role, commit index, per-follower
//! replication progress and follower liveness.
//!
//! The replication engine owns this state; the truncation queue only reads
//! owned snapshots of it through [`RaftGroup`].

mod follower_activity;
pub use follower_activity::*;

#[cfg(test)]
mod follower_activity_test;

use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
use mockall::automock;
use tokio::time::Instant;

use crate::GroupId;
use crate::Index;
use crate::LogStorage;
use crate::PeerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaftRole {
    Follower,
    Candidate,
    Leader,
    Learner,
}

/// Replication state of one follower as tracked by the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationState {
    /// The leader does not know the follower's true position yet and sends
    /// at most one append per heartbeat to find it.
    Probe,
    /// Steady state: entries are streamed optimistically.
    Replicate,
    /// The follower is receiving a full state transfer.
    Snapshot,
}

impl fmt::Display for ReplicationState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ReplicationState::Probe => write!(f, "probe"),
            ReplicationState::Replicate => write!(f, "replicate"),
            ReplicationState::Snapshot => write!(f, "snapshot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Highest index the follower durably stored
    pub match_index: Index,
    /// Next index the leader will send
    pub next_index: Index,
    pub state: ReplicationState,
    /// Overwritten by the liveness overlay before any decision is made
    pub recently_active: bool,
    /// In-flight state transfer target as self-reported by the replication
    /// engine (0 = none). Never trusted here; cleared by the overlay.
    pub pending_snapshot: Index,
}

impl Progress {
    pub fn new(
        match_index: Index,
        next_index: Index,
        state: ReplicationState,
    ) -> Self {
        Self {
            match_index,
            next_index,
            state,
            recently_active: false,
            pending_snapshot: 0,
        }
    }

    pub fn replicating(match_index: Index) -> Self {
        Self::new(match_index, match_index + 1, ReplicationState::Replicate)
    }

    pub fn probing(match_index: Index) -> Self {
        Self::new(match_index, match_index + 1, ReplicationState::Probe)
    }

    pub fn active(mut self) -> Self {
        self.recently_active = true;
        self
    }
}

/// Snapshot of the consensus state of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct RaftStatus {
    pub role: RaftRole,
    pub commit_index: Index,
    /// Keyed by peer id; on the leader this includes the leader itself.
    pub progress: BTreeMap<PeerId, Progress>,
}

impl RaftStatus {
    pub fn is_leader(&self) -> bool {
        self.role == RaftRole::Leader
    }
}

#[cfg_attr(test, automock)]
pub trait LivenessOracle: Send + Sync + 'static {
    /// Whether the leader heard from `peer_id` within `window` before `now`.
    fn is_follower_active_since(
        &self,
        peer_id: PeerId,
        now: Instant,
        window: std::time::Duration,
    ) -> bool;
}

/// Handle to the leader-side state of one group.
///
/// Every accessor returns owned data. Implementations take their read lock
/// inside the call and release it before returning, so nothing is held while
/// a truncation is being submitted.
pub trait RaftGroup: Send + Sync + 'static {
    fn group_id(&self) -> GroupId;

    fn log_storage(&self) -> &dyn LogStorage;

    /// `None` when the group has no live consensus state.
    fn raft_status(&self) -> Option<RaftStatus>;

    /// Current members of the group (voters and learners).
    fn members(&self) -> Vec<PeerId>;

    /// Lowest index still required by any follower currently receiving a
    /// state transfer, taken from out-of-band transfer tracking.
    fn pending_transfer_target(&self) -> Option<Index>;

    fn liveness(&self) -> &dyn LivenessOracle;

    /// Group-specific cap on the log size (e.g. the group's max data size).
    fn max_log_size_override(&self) -> Option<u64> {
        None
    }
}
