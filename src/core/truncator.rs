use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;

use super::evaluate_admission;
use super::evaluate_admission_opt;
use super::new_truncation_decision;
use super::TruncationDecision;
use crate::utils::async_task::run_cancellable;
use crate::utils::every_n::EveryN;
use crate::QueueProcessor;
use crate::RaftGroup;
use crate::Result;
use crate::StorageError;
use crate::TruncateDispatcher;
use crate::TruncateLogRequest;
use crate::TruncationMetrics;
use crate::TruncatorConfig;

/// Leader-side executor of log truncations.
///
/// Stateless per group: every call re-reads the group and re-derives the
/// safe bound, so stale or overlapping invocations are harmless. Running two
/// calls for the same group at once is still the scheduler's job to prevent.
pub struct RaftLogTruncator<D>
where
    D: TruncateDispatcher,
{
    config: Arc<TruncatorConfig>,
    dispatcher: Arc<D>,
    metrics: TruncationMetrics,
    decision_log: EveryN,
}

impl<D> RaftLogTruncator<D>
where
    D: TruncateDispatcher,
{
    pub fn new(
        config: Arc<TruncatorConfig>,
        dispatcher: Arc<D>,
        metrics: TruncationMetrics,
    ) -> Self {
        let decision_log = EveryN::new(config.timeouts.decision_log_interval());
        Self {
            config,
            dispatcher,
            metrics,
            decision_log,
        }
    }

    pub fn config(&self) -> &TruncatorConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<D> {
        &self.dispatcher
    }

    pub fn metrics(&self) -> &TruncationMetrics {
        &self.metrics
    }

    /// Recomputes the group's log size, bounded by the recompute timeout.
    async fn recompute_log_size<G>(
        &self,
        group: &G,
        cancel: &CancellationToken,
    ) -> Result<u64>
    where
        G: RaftGroup + ?Sized,
    {
        let group_id = group.group_id();
        let size = run_cancellable(
            "raft log size recompute",
            cancel,
            self.config.timeouts.size_recompute_timeout(),
            group.log_storage().recompute_size(),
        )
        .await
        .map_err(|e| StorageError::SizeRecompute {
            group_id,
            source: Box::new(e),
        })?;
        debug!(group_id, size, "recomputed raft log size");
        Ok(size)
    }

    fn log_decision(
        &self,
        decision: &TruncationDecision,
    ) {
        let group_id = decision.input.group_id;
        let rendered = decision.display(&self.config.truncation);
        if decision.new_required_transfers() > 0 && self.decision_log.should_process(Instant::now()) {
            info!(group_id, decision = %rendered, "truncating raft log");
        } else {
            debug!(group_id, decision = %rendered, "truncating raft log");
        }
    }
}

#[async_trait]
impl<G, D> QueueProcessor<G> for RaftLogTruncator<D>
where
    G: RaftGroup + ?Sized,
    D: TruncateDispatcher,
{
    /// Admission entry point: `(should_admit, priority)`.
    fn should_admit(
        &self,
        now: Instant,
        group: &G,
    ) -> (bool, f64) {
        let decision = new_truncation_decision(group, &self.config, now);
        let verdict = evaluate_admission_opt(decision.as_ref(), &self.config.truncation);
        trace!(group_id = group.group_id(), ?verdict, "admission verdict");
        (verdict.should_admit, verdict.priority)
    }

    async fn process(
        &self,
        group: &G,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let group_id = group.group_id();

        let Some(mut decision) = new_truncation_decision(group, &self.config, Instant::now()) else {
            trace!(group_id, "nothing to decide");
            return Ok(false);
        };

        if evaluate_admission(&decision, &self.config.truncation).needs_size_recompute {
            self.recompute_log_size(group, cancel).await?;
            // Leadership or bounds may have changed while recomputing.
            match new_truncation_decision(group, &self.config, Instant::now()) {
                Some(refreshed) => decision = refreshed,
                None => {
                    trace!(group_id, "nothing to decide after size recompute");
                    return Ok(false);
                }
            }
        }

        if !decision.should_truncate(&self.config.truncation) {
            debug!(
                group_id,
                decision = %decision.display(&self.config.truncation),
                "skipping raft log truncation"
            );
            return Ok(false);
        }

        self.log_decision(&decision);

        let request = TruncateLogRequest::new(group_id, decision.new_compacted_index, decision.input.compacted_index)?;
        run_cancellable(
            "truncate log submission",
            cancel,
            self.config.timeouts.submit_timeout(),
            self.dispatcher.submit_truncate(request),
        )
        .await?;

        group
            .log_storage()
            .record_pending_truncation(decision.new_compacted_index, request.expected_first_index);
        self.metrics
            .truncated_entries
            .inc_by(decision.num_truncatable_entries());
        debug!(group_id, %request, "submitted raft log truncation");
        Ok(true)
    }

    /// Zero: groups are processed as soon as they are admitted.
    fn polling_interval(&self) -> Duration {
        Duration::ZERO
    }

    /// Failures are retried through re-admission, never through a purgatory.
    fn purgatory_chan(&self) -> Option<Arc<Notify>> {
        None
    }
}
