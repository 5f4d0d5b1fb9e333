//! Timeout Scheduler - fails pending requests that outlive their deadline.
//!
//! Each armed timer is a tokio task that sleeps for the request's budget and
//! then races the response router to resolve the entry. The returned
//! [`TimeoutHandle`] aborts the task; the pending table drops it as soon as
//! the entry resolves, so a timer never fires for a request that already has
//! its outcome.

use crate::correlation::pending::PendingRequestTable;
use crate::domain::config::MAX_REQUEST_TIMEOUT;
use crate::domain::error::RequestError;
use shared_types::RequestId;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Cancellation handle for an armed timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimeoutHandle {
    abort: AbortHandle,
}

impl TimeoutHandle {
    /// Cancel the timer. No-op if it already fired.
    pub fn cancel(self) {
        // Drop does the work
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for TimeoutHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Arms per-request deadline timers against a pending table.
#[derive(Clone)]
pub struct TimeoutScheduler {
    table: Weak<PendingRequestTable>,
}

impl TimeoutScheduler {
    /// Timers hold only a weak reference, so they never keep the table alive.
    pub fn new(table: &Arc<PendingRequestTable>) -> Self {
        Self {
            table: Arc::downgrade(table),
        }
    }

    /// Schedule a [`RequestError::Timeout`] for `id` after `duration`.
    ///
    /// Durations above [`MAX_REQUEST_TIMEOUT`] are clamped to it. Must be
    /// called from within a tokio runtime.
    pub fn arm(&self, id: RequestId, method: &str, duration: Duration) -> TimeoutHandle {
        let table = self.table.clone();
        let method = method.to_string();
        let duration = duration.min(MAX_REQUEST_TIMEOUT);
        let deadline = tokio::time::Instant::now() + duration;

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let Some(table) = table.upgrade() else {
                return;
            };

            let error = RequestError::timed_out(method.as_str(), duration);
            if table.resolve_with_error(id, error) {
                warn!(
                    request_id = %id,
                    method = %method,
                    timeout_ms = duration.as_millis() as u64,
                    "JSON-RPC request timed out"
                );
            } else {
                debug!(request_id = %id, "Timer fired for already resolved request");
            }
        });

        TimeoutHandle {
            abort: task.abort_handle(),
        }
    }
}
