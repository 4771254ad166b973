use std::collections::BTreeMap;

use tracing::trace;

use crate::PeerId;
use crate::Progress;

/// Overlays the leader's own liveness view onto raw replication progress.
///
/// For every member with a progress entry, `recently_active` is replaced by
/// `is_active(peer_id)`. Members without an entry are not replicating yet and
/// are skipped. The engine's self-reported transfer marker is cleared: it is
/// set when the leader decides a follower needs a transfer, not with the
/// index the out-of-band transfer actually carries, which is usually lower.
/// Callers use the separately tracked pending snapshot index instead.
pub fn update_progress_from_activity<F>(
    progress: &mut BTreeMap<PeerId, Progress>,
    members: &[PeerId],
    is_active: F,
) where
    F: Fn(PeerId) -> bool,
{
    for &peer_id in members {
        let Some(pr) = progress.get_mut(&peer_id) else {
            continue;
        };
        pr.recently_active = is_active(peer_id);
        pr.pending_snapshot = 0;
        trace!(
            peer_id,
            recently_active = pr.recently_active,
            state = %pr.state,
            "follower progress after activity check"
        );
    }
}
