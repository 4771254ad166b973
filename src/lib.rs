//! # raft-log-truncator
//!
//! Leader-side raft log truncation for multi-raft storage nodes.
//!
//! For every group it leads, a node periodically decides how far the raft
//! log can be compacted: as far as possible to bound disk usage, but never
//! past what a live follower still needs, since a follower cut off from the
//! log has to be caught up with a full state transfer.
//!
//! ## Pipeline
//!
//! - [`assemble_decision_input`] captures one [`DecisionInput`] per
//!   evaluation, with follower liveness overlaid on raw replication progress
//! - [`compute_truncation_decision`] turns it into a [`TruncationDecision`]
//! - [`evaluate_admission`] decides whether the group should be queued
//! - [`RaftLogTruncator`] recomputes untrusted sizes and submits the
//!   truncation through a [`TruncateDispatcher`]
//! - [`TruncationQueue`] deduplicates, orders and bounds the work
//!
//! ## Key Traits
//!
//! - [`RaftGroup`] - Handle to one group's leader-side state
//! - [`LogStorage`] - Log bounds, size accounting, pending truncations
//! - [`LivenessOracle`] - Recent follower activity
//! - [`TruncateDispatcher`] - Proposes the truncation command
//! - [`QueueProcessor`] - Scheduling contract implemented by the truncator

mod config;
mod core;
mod errors;
mod membership;
mod metrics;
mod network;
mod queue;
mod storage;
pub mod utils;

pub use config::*;
pub use self::core::*;
pub use errors::*;
pub use membership::*;
pub use metrics::*;
pub use network::*;
pub use queue::*;
pub use storage::*;

#[cfg(test)]
mod errors_test;

#[cfg(test)]
pub(crate) mod test_utils;

/// Raft log index.
pub type Index = u64;
/// Node id of a group member.
pub type PeerId = u32;
pub type GroupId = u64;
