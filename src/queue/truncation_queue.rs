use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::QueueProcessor;
use crate::GroupId;
use crate::QueueConfig;
use crate::RaftGroup;
use crate::TruncationMetrics;

/// Heap entry. Entries whose `seq` no longer matches the queued group are
/// stale and skipped on pop.
#[derive(Debug)]
struct QueueItem {
    priority: f64,
    seq: u64,
    group_id: GroupId,
}

impl PartialEq for QueueItem {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    // Max-heap: higher priority first, then FIFO.
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Queued<G: ?Sized> {
    group: Arc<G>,
    priority: f64,
    seq: u64,
}

struct QueueState<G: ?Sized> {
    heap: BinaryHeap<QueueItem>,
    queued: HashMap<GroupId, Queued<G>>,
    /// Groups being processed, with the re-admission requested meanwhile
    processing: HashMap<GroupId, Option<(Arc<G>, f64)>>,
    next_seq: u64,
}

impl<G: ?Sized> QueueState<G> {
    fn push(
        &mut self,
        group_id: GroupId,
        group: Arc<G>,
        priority: f64,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueItem {
            priority,
            seq,
            group_id,
        });
        self.queued.insert(group_id, Queued { group, priority, seq });
    }
}

/// Outcome of an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Queued,
    /// Already queued; the priority was raised if the new one is higher.
    Deduplicated,
    /// Being processed; the group is re-evaluated once processing finishes.
    Requeued,
    Full,
    Disabled,
}

/// Reference scheduler for a [`QueueProcessor`].
///
/// Each group is queued at most once and processed by at most one worker at
/// a time; distinct groups are processed concurrently up to
/// `QueueConfig::concurrency`.
pub struct TruncationQueue<G, P>
where
    G: RaftGroup + ?Sized,
    P: QueueProcessor<G>,
{
    config: QueueConfig,
    processor: Arc<P>,
    metrics: TruncationMetrics,
    state: Mutex<QueueState<G>>,
    semaphore: Arc<Semaphore>,
    notify: Notify,
}

impl<G, P> TruncationQueue<G, P>
where
    G: RaftGroup + ?Sized,
    P: QueueProcessor<G>,
{
    pub fn new(
        config: QueueConfig,
        processor: Arc<P>,
        metrics: TruncationMetrics,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            config,
            processor,
            metrics,
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                queued: HashMap::new(),
                processing: HashMap::new(),
                next_seq: 0,
            }),
            semaphore,
            notify: Notify::new(),
        }
    }

    pub fn processor(&self) -> &Arc<P> {
        &self.processor
    }

    pub fn metrics(&self) -> &TruncationMetrics {
        &self.metrics
    }

    /// Number of queued groups, not counting those being processed.
    pub fn pending_len(&self) -> usize {
        self.state.lock().queued.len()
    }

    pub fn is_processing(
        &self,
        group_id: GroupId,
    ) -> bool {
        self.state.lock().processing.contains_key(&group_id)
    }

    /// Asks the processor whether `group` should be queued and queues it if so.
    pub fn maybe_add(
        &self,
        group: Arc<G>,
        now: Instant,
    ) -> Option<AddOutcome> {
        if !self.config.enabled {
            return Some(AddOutcome::Disabled);
        }
        let (should_admit, priority) = self.processor.should_admit(now, &group);
        if !should_admit {
            return None;
        }
        Some(self.add(group, priority))
    }

    /// Queues `group` at `priority` without consulting the processor.
    pub fn add(
        &self,
        group: Arc<G>,
        priority: f64,
    ) -> AddOutcome {
        if !self.config.enabled {
            return AddOutcome::Disabled;
        }
        let group_id = group.group_id();

        let outcome = {
            let mut state = self.state.lock();

            if let Some(slot) = state.processing.get_mut(&group_id) {
                if !matches!(slot, Some((_, p)) if *p >= priority) {
                    *slot = Some((group, priority));
                }
                AddOutcome::Requeued
            } else if let Some(queued) = state.queued.get(&group_id) {
                if priority > queued.priority {
                    let group = queued.group.clone();
                    state.push(group_id, group, priority);
                }
                AddOutcome::Deduplicated
            } else if state.queued.len() >= self.config.max_size {
                AddOutcome::Full
            } else {
                state.push(group_id, group, priority);
                self.metrics.pending.set(state.queued.len() as i64);
                AddOutcome::Queued
            }
        };

        match outcome {
            AddOutcome::Queued => {
                trace!(group_id, priority, "queued group");
                self.notify.notify_one();
            }
            AddOutcome::Full => warn!(group_id, max_size = self.config.max_size, "queue full, dropping group"),
            _ => trace!(group_id, ?outcome, "admission request absorbed"),
        }
        outcome
    }

    /// Full scan: requests admission for every group. Returns how many were
    /// newly queued.
    pub fn scan<I>(
        &self,
        groups: I,
        now: Instant,
    ) -> usize
    where
        I: IntoIterator<Item = Arc<G>>,
    {
        let queued = groups
            .into_iter()
            .filter(|g| self.maybe_add(g.clone(), now) == Some(AddOutcome::Queued))
            .count();
        debug!(queued, "scan finished");
        queued
    }

    /// Pops the highest priority group and marks it as processing.
    fn pop_next(&self) -> Option<Arc<G>> {
        let mut state = self.state.lock();
        while let Some(item) = state.heap.pop() {
            let current = matches!(state.queued.get(&item.group_id), Some(q) if q.seq == item.seq);
            if !current {
                continue;
            }
            if let Some(queued) = state.queued.remove(&item.group_id) {
                state.processing.insert(item.group_id, None);
                self.metrics.pending.set(state.queued.len() as i64);
                return Some(queued.group);
            }
        }
        None
    }

    /// Processes one popped group, then re-queues it if it was re-admitted
    /// in the meantime.
    async fn process_group(
        &self,
        group: Arc<G>,
        cancel: &CancellationToken,
    ) {
        let group_id = group.group_id();
        let start = Instant::now();

        match self.processor.process(&group, cancel).await {
            Ok(processed) => {
                self.metrics.successes.inc();
                trace!(group_id, processed, "processed group");
            }
            Err(e) => {
                self.metrics.failures.inc();
                warn!(group_id, recoverable = e.is_recoverable(), "failed to process group: {:?}", e);
            }
        }
        self.metrics
            .processing_nanos
            .inc_by(start.elapsed().as_nanos() as u64);

        let requeue = self.state.lock().processing.remove(&group_id).flatten();
        if let Some((group, priority)) = requeue {
            self.add(group, priority);
        }
    }

    /// Processes queued groups one at a time until the queue is empty.
    /// Returns the number of groups processed.
    pub async fn drain(
        &self,
        cancel: &CancellationToken,
    ) -> usize {
        let mut n = 0;
        while !cancel.is_cancelled() {
            let Some(group) = self.pop_next() else {
                break;
            };
            self.process_group(group, cancel).await;
            n += 1;
        }
        n
    }

    /// Worker loop: processes groups as they are queued, at most
    /// `concurrency` at a time, until `cancel` fires. In-flight groups see
    /// the cancellation through a child token.
    pub async fn run(
        self: Arc<Self>,
        cancel: CancellationToken,
    ) {
        let interval = self.processor.polling_interval();
        let purgatory = self.processor.purgatory_chan();
        debug!(concurrency = self.config.concurrency, ?interval, "truncation queue started");

        loop {
            let permit = tokio::select! {
                _ = cancel.cancelled() => break,
                permit = self.semaphore.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            let group = loop {
                if let Some(group) = self.pop_next() {
                    break group;
                }
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("truncation queue stopped");
                        return;
                    }
                    _ = self.notify.notified() => {}
                    _ = wait_purgatory(&purgatory) => {}
                }
            };

            let queue = self.clone();
            let child = cancel.child_token();
            tokio::spawn(async move {
                queue.process_group(group, &child).await;
                drop(permit);
            });

            if !interval.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(interval) => {}
                }
            }
        }
        debug!("truncation queue stopped");
    }
}

async fn wait_purgatory(purgatory: &Option<Arc<Notify>>) {
    match purgatory {
        Some(n) => n.notified().await,
        None => std::future::pending().await,
    }
}
