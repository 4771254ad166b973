use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::Result;
use crate::SystemError;

/// Runs `task` until it completes, `deadline` elapses, or `cancel` fires.
///
/// Cancellation and timeouts surface as errors; the task is never retried
/// here. Callers that want another attempt rely on re-admission.
pub(crate) async fn run_cancellable<F, T>(
    operation: &'static str,
    cancel: &CancellationToken,
    deadline: Duration,
    task: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(SystemError::Cancelled { operation }.into());
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(operation, "cancelled");
            Err(SystemError::Cancelled { operation }.into())
        }
        res = timeout(deadline, task) => match res {
            Ok(r) => r,
            Err(_) => {
                warn!(operation, ?deadline, "timed out");
                Err(SystemError::Timeout {
                    operation,
                    duration: deadline,
                }
                .into())
            }
        },
    }
}
