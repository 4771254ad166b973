//! Dispatch seam for the truncation command.
//!
//! The command is proposed through the group's consensus so that it acts as
//! an upper bound on what every replica may discard.


use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::DispatchError;
use crate::GroupId;
use crate::Index;
use crate::Result;

/// Truncation command for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncateLogRequest {
    pub group_id: GroupId,
    /// First index to keep; every entry below it is discarded.
    pub index: Index,
    /// First index the proposer saw. The receiving side rejects the command
    /// when its first index differs, which detects racing truncations.
    pub expected_first_index: Index,
}

impl TruncateLogRequest {
    /// Fails when either first index would not fit in an [`Index`].
    pub fn new(
        group_id: GroupId,
        new_compacted_index: Index,
        compacted_index: Index,
    ) -> Result<Self> {
        let first_index_after = |index: Index| {
            index
                .checked_add(1)
                .ok_or(DispatchError::IndexOverflow { group_id, index })
        };
        Ok(Self {
            group_id,
            index: first_index_after(new_compacted_index)?,
            expected_first_index: first_index_after(compacted_index)?,
        })
    }
}

impl fmt::Display for TruncateLogRequest {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "truncate group {} log to index {} (expected first index {})",
            self.group_id, self.index, self.expected_first_index
        )
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TruncateDispatcher: Send + Sync + 'static {
    /// Submits the truncation command. An error means nothing was truncated.
    async fn submit_truncate(
        &self,
        request: TruncateLogRequest,
    ) -> Result<()>;
}
