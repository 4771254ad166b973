//! Core model: log storage as seen by the truncation queue

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Index;
use crate::Result;

/// Log bounds and size as of one instant, with pending truncations applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSnapshot {
    /// Size as if every pending truncation had been enacted
    pub size_bytes: u64,
    /// Read before pending truncations are applied
    pub size_trusted: bool,
    /// Compacted index as if every pending truncation had been enacted
    pub compacted_index: Index,
    pub last_index: Index,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogStorage: Send + Sync + 'static {
    /// Tracked log size in bytes and whether that figure can be trusted.
    ///
    /// The size is untrusted after a restart (it starts at zero) or when the
    /// accounting detected a discrepancy; it must be recomputed before a
    /// size-based decision relies on it.
    fn size_and_trust(&self) -> (u64, bool);

    /// Reads size, trust and bounds together.
    ///
    /// Implementations with a log lock should override this and read
    /// everything under one shared lock, so that enacting a truncation is
    /// never observed halfway.
    fn snapshot(&self) -> LogSnapshot {
        let (size, size_trusted) = self.size_and_trust();
        LogSnapshot {
            size_bytes: self.post_pending_truncation_size(size),
            size_trusted,
            compacted_index: self.next_compacted_index_with_pending(self.compacted_index()),
            last_index: self.last_index(),
        }
    }

    /// Recomputes the log size from the entries on disk and marks it trusted.
    async fn recompute_size(&self) -> Result<u64>;

    /// Index of the last discarded entry as it is physically on disk.
    fn compacted_index(&self) -> Index;

    fn last_index(&self) -> Index;

    /// Compacted index as if every pending truncation had been enacted.
    fn next_compacted_index_with_pending(
        &self,
        base: Index,
    ) -> Index;

    /// Log size as if every pending truncation had been enacted.
    fn post_pending_truncation_size(
        &self,
        base_size: u64,
    ) -> u64;

    /// Records a truncation that has been proposed but is not yet durable.
    ///
    /// `compacted_index` is the new compacted index (the last discarded entry).
    fn record_pending_truncation(
        &self,
        compacted_index: Index,
        expected_first_index: Index,
    );
}
