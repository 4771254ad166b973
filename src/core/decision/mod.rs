//! Truncation decision algorithm.
//!
//! A decision starts from the most aggressive truncation possible (discard
//! the whole log) and only ever lowers the target through
//! [`TruncationDecision::protect_after`]. Each protection records why it won,
//! which is what ends up in logs and tests.
//!
//! Followers that are behind but still recently active always protect the
//! log. Followers that went quiet only protect it while the log is below its
//! size limit. Cutting off a lagging follower at the commit index on every
//! pass would force it into a state transfer; if producing and applying that
//! transfer is slower than the log grows, the follower never catches up and
//! transfers repeat forever. Letting the log grow to the limit first bounds
//! this to one transfer per lagging follower.

mod display;
pub use display::*;

#[cfg(test)]
mod decision_proptest;

use std::collections::BTreeMap;
use std::fmt;

use tracing::error;

use crate::GroupId;
use crate::Index;
use crate::InvariantViolation;
use crate::PeerId;
use crate::Progress;
use crate::ReplicationState;
use crate::TruncationConfig;

/// Which protection determined the final compacted index.
///
/// Diagnostic only: it never changes behavior and never carries data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonTag {
    /// Capped at the commit index: uncommitted entries are never truncated.
    CommittedIndex,
    /// Capped at some follower's match index.
    FollowerProgress,
    /// A live follower is being probed; truncation is denied.
    ProbingFollower,
    /// Capped at an in-flight state transfer's index.
    PendingSnapshot,
    /// Protections fell below the current floor; the decision is a no-op.
    NoOpFloor,
    /// Nothing protected the log; truncate all of it.
    FullLog,
}

impl ReasonTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonTag::CommittedIndex => "commit",
            ReasonTag::FollowerProgress => "followers",
            ReasonTag::ProbingFollower => "probing follower",
            ReasonTag::PendingSnapshot => "pending snapshot",
            ReasonTag::NoOpFloor => "first index",
            ReasonTag::FullLog => "last index",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one decision is based on, captured once per evaluation.
///
/// No ordering between `committed_index`, `compacted_index` and `last_index`
/// may be assumed: they are not read atomically, and `compacted_index`
/// already accounts for pending truncations, so it can exceed both of the
/// others. Whether the log is empty is decided by `compacted_index < last_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInput {
    pub group_id: GroupId,
    pub committed_index: Index,
    pub last_index: Index,
    pub compacted_index: Index,
    pub log_size_bytes: u64,
    pub max_log_size_bytes: u64,
    /// False when `log_size_bytes` may be off and must be recomputed
    pub log_size_trusted: bool,
    /// Lowest index an in-flight state transfer still needs (0 = none)
    pub pending_snapshot_index: Index,
    pub progress: BTreeMap<PeerId, Progress>,
}

impl DecisionInput {
    pub fn log_too_large(&self) -> bool {
        self.log_size_bytes > self.max_log_size_bytes
    }

    pub fn log_empty(&self) -> bool {
        self.compacted_index >= self.last_index
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncationDecision {
    pub input: DecisionInput,
    /// Compacted index after the truncation
    pub new_compacted_index: Index,
    pub chosen_via: ReasonTag,
}

impl TruncationDecision {
    /// Prevents truncation of indexes above `compacted`: lowers the target to
    /// `compacted` if that is lower, and records `reason` when it does.
    pub fn protect_after(
        &mut self,
        compacted: Index,
        reason: ReasonTag,
    ) {
        if compacted < self.new_compacted_index {
            self.new_compacted_index = compacted;
            self.chosen_via = reason;
        }
    }

    pub fn num_truncatable_entries(&self) -> u64 {
        self.new_compacted_index.saturating_sub(self.input.compacted_index)
    }

    /// Whether the decision is worth proposing: either enough entries, or
    /// any entries at all once the log carries enough bytes.
    pub fn should_truncate(
        &self,
        thresholds: &TruncationConfig,
    ) -> bool {
        let n = self.num_truncatable_entries();
        n >= thresholds.stale_entry_threshold || (n > 0 && self.input.log_size_bytes >= thresholds.stale_size_threshold_bytes)
    }

    /// Number of state transfers needed if the log were compacted at `compact`.
    fn transfers_for_index(
        &self,
        compact: Index,
    ) -> usize {
        let mut n = self
            .input
            .progress
            .values()
            // Followers that are not replicating are already protected by the
            // decision itself, and their next index is not meaningful.
            .filter(|p| p.state == ReplicationState::Replicate)
            // next <= compact: at least one entry at or after `compact` has
            // not been sent yet. Match < compact alone is fine when the
            // entries are already in flight.
            .filter(|p| p.next_index <= compact)
            .count();

        let snap = self.input.pending_snapshot_index;
        if snap != 0 && snap < compact {
            n += 1;
        }
        n
    }

    /// Additional state transfers this decision would cause. Reporting only.
    pub fn new_required_transfers(&self) -> usize {
        self.transfers_for_index(self.new_compacted_index)
            .saturating_sub(self.transfers_for_index(self.input.compacted_index))
    }
}

/// Computes the largest safe compacted index for `input`.
///
/// Pure: no I/O, no locking, same input same output.
///
/// # Panics
/// When the result breaks the index invariants (see
/// [`check_decision_invariants`]). That can only happen through a logic
/// defect, and truncating past an unsafe bound is worse than stopping.
pub fn compute_truncation_decision(input: DecisionInput) -> TruncationDecision {
    let commit_index = input.committed_index;
    let floor = input.compacted_index;
    let log_too_large = input.log_too_large();

    // Most aggressive possible truncation: the entire log.
    let mut decision = TruncationDecision {
        new_compacted_index: input.last_index,
        chosen_via: ReasonTag::FullLog,
        input,
    };

    // Last index can trail the commit index in single-member groups because
    // the two are not updated atomically; keep this cap regardless.
    decision.protect_after(commit_index, ReasonTag::CommittedIndex);

    let mut protections = Vec::with_capacity(decision.input.progress.len());
    for progress in decision.input.progress.values() {
        if progress.recently_active {
            // A live follower being probed has no known safe index yet; it
            // should resolve quickly, so deny truncation for now.
            if progress.state == ReplicationState::Probe {
                protections.push((floor, ReasonTag::ProbingFollower));
            } else {
                protections.push((progress.match_index, ReasonTag::FollowerProgress));
            }
            continue;
        }

        // Quiet followers hold the log only until it grows too large; past
        // that they are left to catch up through a state transfer.
        if !log_too_large {
            protections.push((progress.match_index, ReasonTag::FollowerProgress));
        }
    }
    for (compacted, reason) in protections {
        decision.protect_after(compacted, reason);
    }

    // A transfer already in flight must not be invalidated by truncating
    // past its target.
    let snap = decision.input.pending_snapshot_index;
    if snap > 0 {
        decision.protect_after(snap, ReasonTag::PendingSnapshot);
    }

    // Never regress the compacted index; fall back to an explicit no-op.
    if decision.new_compacted_index < floor {
        decision.new_compacted_index = floor;
        decision.chosen_via = ReasonTag::NoOpFloor;
    }

    if let Err(violation) = check_decision_invariants(&decision) {
        error!(group_id = decision.input.group_id, %violation, "refusing to continue");
        panic!("{violation}");
    }

    decision
}

/// Checks the index ordering every decision must keep.
///
/// Gated on the log being non-empty (`compacted < last`) and on there being
/// committed entries (`compacted < commit`):
///
/// - `compacted <= new_compacted <= last`
/// - `new_compacted <= commit`
pub fn check_decision_invariants(decision: &TruncationDecision) -> std::result::Result<(), InvariantViolation> {
    let input = &decision.input;
    let new_compacted = decision.new_compacted_index;

    let log_empty = input.log_empty();
    let no_committed_entries = input.compacted_index >= input.committed_index;

    let log_index_valid = log_empty || (new_compacted >= input.compacted_index && new_compacted <= input.last_index);
    let commit_index_valid = no_committed_entries || new_compacted <= input.committed_index;

    if log_index_valid && commit_index_valid {
        return Ok(());
    }

    Err(InvariantViolation {
        new_compacted_index: new_compacted,
        compacted_index: input.compacted_index,
        last_index: input.last_index,
        committed_index: input.committed_index,
    })
}
