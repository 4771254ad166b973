//! Raft Log Truncation Error Hierarchy
//!
//! Errors are grouped by the collaborator that produced them. Decisions that
//! cannot be made (not leader, no raft group) are not errors at all; see
//! [`crate::new_truncation_decision`].

use std::time::Duration;

use config::ConfigError;

use crate::GroupId;
use crate::Index;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (log storage, dispatch, cancellation)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unrecoverable failures requiring process termination. Never raised
    /// by the truncation pipeline itself; available to collaborator
    /// implementations and reported as non-recoverable by the queue.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Truncation dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// The caller's cancellation token fired while waiting on a collaborator
    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: &'static str,
        duration: Duration,
    },

    #[error("Metrics failure: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Generic failure for `LogStorage` implementations, e.g. a failed
    /// disk read while recomputing the log size
    #[error("Log storage failure: {0}")]
    LogStorage(String),

    /// Recomputing the raft log size failed. Recoverable: the group is
    /// re-admitted by the periodic scan.
    #[error("recomputing raft log size of group {group_id}")]
    SizeRecompute {
        group_id: GroupId,
        #[source]
        source: Box<Error>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The receiving side saw a different first index than the proposer
    /// expected, i.e. another truncation raced with this one.
    #[error("group {group_id}: expected first index {expected}, found {actual}")]
    FirstIndexMismatch {
        group_id: GroupId,
        expected: Index,
        actual: Index,
    },

    /// Truncation target lies outside the retained log
    #[error("group {group_id}: truncation index {index} outside log ({first_index}, {last_index}]")]
    IndexOutOfRange {
        group_id: GroupId,
        index: Index,
        first_index: Index,
        last_index: Index,
    },

    /// Returned by dispatcher implementations whose replica lost leadership
    /// before the command was proposed.
    #[error("group {group_id}: local replica is no longer leader")]
    NotLeader { group_id: GroupId },

    /// Returned by dispatcher implementations that could not reach the
    /// consensus layer.
    #[error("Network unreachable: {0}")]
    Unreachable(String),

    /// The first index after `index` does not fit in an index.
    #[error("group {group_id}: no index follows {index}")]
    IndexOverflow { group_id: GroupId, index: Index },
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::System(SystemError::Storage(e))
    }
}

impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        Error::System(SystemError::Dispatch(e))
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Error::System(SystemError::Metrics(e))
    }
}

impl Error {
    /// Whether retrying on a later scheduling turn may succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Fatal(_) | Error::Config(_))
    }
}

/// A computed truncation decision broke the index ordering it must keep.
///
/// This is a logic defect (e.g. a collaborator handed out an inconsistent
/// snapshot), never an environmental condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid truncation decision: output = {new_compacted_index}, input: ({compacted_index}, {last_index}], commit idx = {committed_index}"
)]
pub struct InvariantViolation {
    pub new_compacted_index: Index,
    pub compacted_index: Index,
    pub last_index: Index,
    pub committed_index: Index,
}
