use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::MemLogStorage;
use crate::Result;
use crate::TruncateDispatcher;
use crate::TruncateLogRequest;

/// Dispatcher that records every submission. When backed by a log, it
/// validates requests the way the receiving side would.
#[derive(Default)]
pub(crate) struct CountingDispatcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<TruncateLogRequest>>,
    log: Option<Arc<MemLogStorage>>,
}

impl CountingDispatcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn validating(log: Arc<MemLogStorage>) -> Self {
        Self {
            log: Some(log),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<TruncateLogRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TruncateDispatcher for CountingDispatcher {
    async fn submit_truncate(
        &self,
        request: TruncateLogRequest,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        if let Some(log) = &self.log {
            log.check_truncation(&request)?;
        }
        Ok(())
    }
}
