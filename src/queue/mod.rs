//! Scheduling contract between a queue and the work it runs, plus a
//! reference scheduler.
//!
//! The processor decides (`should_admit`) and acts (`process`); the queue owns
//! deduplication, ordering and concurrency. Both the apply path and the
//! periodic scan only ever *request* admission.

mod truncation_queue;
pub use truncation_queue::*;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// Queueable work item contract, generic over the group handle type.
#[async_trait]
pub trait QueueProcessor<G>: Send + Sync + 'static
where
    G: ?Sized + Send + Sync,
{
    /// Whether `group` should be queued now, and at which priority (higher
    /// first).
    fn should_admit(
        &self,
        now: Instant,
        group: &G,
    ) -> (bool, f64);

    /// Processes one group. `Ok(true)` when work was done, `Ok(false)` for a
    /// no-op. Errors are reported to the queue and never retried in place.
    async fn process(
        &self,
        group: &G,
        cancel: &CancellationToken,
    ) -> Result<bool>;

    /// Minimum delay between two processing turns.
    fn polling_interval(&self) -> Duration;

    /// Signal for re-processing groups parked after a failure, if any.
    fn purgatory_chan(&self) -> Option<Arc<Notify>>;
}
