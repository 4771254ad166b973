use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;

use super::LivenessOracle;
use crate::PeerId;

/// Last time the leader received a message from each follower.
///
/// Updated from the replication path on every response, read concurrently by
/// truncation decisions.
#[derive(Debug, Default)]
pub struct FollowerActivity {
    last_update_times: DashMap<PeerId, Instant>,
}

impl FollowerActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `peer_id` was heard from at `at`. Older timestamps never
    /// overwrite newer ones.
    pub fn record(
        &self,
        peer_id: PeerId,
        at: Instant,
    ) {
        let mut entry = self.last_update_times.entry(peer_id).or_insert(at);
        if *entry < at {
            *entry = at;
        }
    }

    /// Marks every peer in `peers` as heard from at `at`, e.g. when a node
    /// becomes leader and has not had time to hear back yet.
    pub fn record_all(
        &self,
        peers: impl IntoIterator<Item = PeerId>,
        at: Instant,
    ) {
        for peer_id in peers {
            self.record(peer_id, at);
        }
    }

    pub fn remove(
        &self,
        peer_id: PeerId,
    ) {
        self.last_update_times.remove(&peer_id);
    }

    pub fn last_update(
        &self,
        peer_id: PeerId,
    ) -> Option<Instant> {
        self.last_update_times.get(&peer_id).map(|t| *t)
    }
}

impl LivenessOracle for FollowerActivity {
    fn is_follower_active_since(
        &self,
        peer_id: PeerId,
        now: Instant,
        window: Duration,
    ) -> bool {
        let active = match self.last_update_times.get(&peer_id) {
            Some(t) => now.saturating_duration_since(*t) <= window,
            None => false,
        };
        trace!(peer_id, active, "follower activity check");
        active
    }
}
