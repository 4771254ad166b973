//! Prometheus metrics of the truncation queue.
//!
//! Collectors are created unregistered so that every queue owns its own set;
//! call [`TruncationMetrics::register`] to expose them, either on a caller's
//! registry or on the process-wide [`REGISTRY`].


use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntGauge;
use prometheus::Registry;
use prometheus::TextEncoder;

use crate::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
}

#[derive(Debug, Clone)]
pub struct TruncationMetrics {
    /// Entries covered by successfully submitted truncations
    pub truncated_entries: IntCounter,
    pub successes: IntCounter,
    pub failures: IntCounter,
    /// Groups currently waiting in the queue
    pub pending: IntGauge,
    pub processing_nanos: IntCounter,
}

impl TruncationMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            truncated_entries: IntCounter::new("raftlog_truncated", "Number of Raft log entries truncated")?,
            successes: IntCounter::new(
                "queue_raftlog_process_success",
                "Number of groups successfully processed by the Raft log queue",
            )?,
            failures: IntCounter::new(
                "queue_raftlog_process_failure",
                "Number of groups which failed processing in the Raft log queue",
            )?,
            pending: IntGauge::new("queue_raftlog_pending", "Number of pending groups in the Raft log queue")?,
            processing_nanos: IntCounter::new(
                "queue_raftlog_processingnanos",
                "Nanoseconds spent processing groups in the Raft log queue",
            )?,
        })
    }

    pub fn register(
        &self,
        registry: &Registry,
    ) -> Result<()> {
        registry.register(Box::new(self.truncated_entries.clone()))?;
        registry.register(Box::new(self.successes.clone()))?;
        registry.register(Box::new(self.failures.clone()))?;
        registry.register(Box::new(self.pending.clone()))?;
        registry.register(Box::new(self.processing_nanos.clone()))?;
        Ok(())
    }
}

/// Renders `registry` in the Prometheus text exposition format.
pub fn gather_metrics(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
