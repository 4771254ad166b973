use tokio::time::Instant;
use tracing::debug;
use tracing::trace;

use super::compute_truncation_decision;
use super::update_progress_from_activity;
use super::DecisionInput;
use super::TruncationDecision;
use crate::LogSnapshot;
use crate::RaftGroup;
use crate::TruncatorConfig;

/// Captures the decision input for one group.
///
/// Returns `None` when the group has no live consensus state or the local
/// replica is not its leader: only the leader knows every follower's
/// progress, so only the leader proposes truncations.
///
/// Pending truncations are treated as already enacted: the compacted index
/// and the size both assume them. The trust flag is read as is, so pending
/// truncations alone never trigger a size recomputation; once they are
/// enacted the storage flips the flag if needed.
pub fn assemble_decision_input<G>(
    group: &G,
    config: &TruncatorConfig,
    now: Instant,
) -> Option<DecisionInput>
where
    G: RaftGroup + ?Sized,
{
    let group_id = group.group_id();
    let log = group.log_storage();

    let LogSnapshot {
        size_bytes: log_size_bytes,
        size_trusted: log_size_trusted,
        compacted_index,
        last_index,
    } = log.snapshot();
    let max_log_size_bytes = config.truncation.max_log_size(group.max_log_size_override());

    let Some(mut status) = group.raft_status() else {
        trace!(group_id, "the raft group doesn't exist");
        return None;
    };

    if !status.is_leader() {
        trace!(group_id, role = ?status.role, "not leader, skip truncation decision");
        return None;
    }

    let pending_snapshot_index = group.pending_transfer_target().unwrap_or(0);

    let window = config.activity.activity_window();
    let liveness = group.liveness();
    trace!(group_id, progress = ?status.progress, "raft progress before activity check");
    update_progress_from_activity(&mut status.progress, &group.members(), |peer_id| {
        liveness.is_follower_active_since(peer_id, now, window)
    });

    let input = DecisionInput {
        group_id,
        committed_index: status.commit_index,
        last_index,
        compacted_index,
        log_size_bytes,
        max_log_size_bytes,
        log_size_trusted,
        pending_snapshot_index,
        progress: status.progress,
    };
    debug!(
        group_id,
        compacted_index,
        last_index,
        committed_index = input.committed_index,
        log_size_bytes,
        "assembled truncation decision input"
    );
    Some(input)
}

/// Assembles the input and computes the decision in one go.
pub fn new_truncation_decision<G>(
    group: &G,
    config: &TruncatorConfig,
    now: Instant,
) -> Option<TruncationDecision>
where
    G: RaftGroup + ?Sized,
{
    assemble_decision_input(group, config, now).map(compute_truncation_decision)
}
