//! Pending Request Table - correlates outbound requests with their responses.
//!
//! Maps request ids to the single-use completion slot of the waiting caller.
//!
//! Flow:
//! 1. Dispatcher calls `register()` and keeps the returned [`PendingHandle`]
//! 2. Dispatcher arms a timer and pairs it via `attach_timeout()`
//! 3. The router (response) or the timer (deadline) calls `resolve_*()`
//! 4. The dispatcher awaits the handle and receives exactly one outcome
//!
//! Resolution removes the entry from the map before delivering. The map
//! removal is the claim: whichever producer removes the entry first delivers,
//! every later attempt finds nothing and is a no-op.

use crate::correlation::timeout::TimeoutHandle;
use crate::domain::error::{RequestError, RequestResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{RequestId, Topic};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What a waiting caller eventually receives.
pub type Outcome = Result<serde_json::Value, RequestError>;

/// A request waiting for its response
struct PendingRequest {
    /// Completion slot
    sender: oneshot::Sender<Outcome>,
    /// Session the request was sent on
    topic: Topic,
    /// Method name (for logging and timeout errors)
    method: String,
    created_at: Instant,
    deadline: Instant,
    /// Armed timer; dropped (and therefore cancelled) with the entry
    timeout: Option<TimeoutHandle>,
}

/// Statistics for the pending request table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests resolved with a result or remote error
    pub total_completed: AtomicU64,
    /// Total requests resolved by deadline
    pub total_timeouts: AtomicU64,
    /// Total requests removed before resolution, or whose caller went away
    pub total_cancelled: AtomicU64,
}

impl PendingStats {
    pub fn registered(&self) -> u64 {
        self.total_registered.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.total_completed.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.total_timeouts.load(Ordering::Relaxed)
    }

    pub fn cancelled(&self) -> u64 {
        self.total_cancelled.load(Ordering::Relaxed)
    }
}

/// Caller's side of a pending request.
#[derive(Debug)]
pub struct PendingHandle {
    id: RequestId,
    receiver: oneshot::Receiver<Outcome>,
}

impl PendingHandle {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Wait for the single outcome of this request.
    ///
    /// If the entry is removed without being resolved the caller sees
    /// [`RequestError::Cancelled`].
    pub async fn wait(self) -> Outcome {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RequestError::Cancelled(self.id)),
        }
    }
}

/// In-flight requests keyed by request id.
pub struct PendingRequestTable {
    pending: DashMap<RequestId, PendingRequest>,
    stats: Arc<PendingStats>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending request.
    ///
    /// Fails with [`RequestError::DuplicateId`] when `id` is already pending.
    pub fn register(
        &self,
        id: RequestId,
        topic: &Topic,
        method: &str,
        deadline: Instant,
    ) -> RequestResult<PendingHandle> {
        let (sender, receiver) = oneshot::channel();

        match self.pending.entry(id) {
            Entry::Occupied(_) => {
                warn!(request_id = %id, method = method, "Refusing duplicate pending request id");
                return Err(RequestError::DuplicateId(id));
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingRequest {
                    sender,
                    topic: topic.clone(),
                    method: method.to_string(),
                    created_at: Instant::now(),
                    deadline,
                    timeout: None,
                });
            }
        }

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            request_id = %id,
            topic = %topic,
            method = method,
            "Registered pending request"
        );

        Ok(PendingHandle { id, receiver })
    }

    /// Pair an armed timer with its entry.
    ///
    /// Returns false if the entry is already gone; the handle is then dropped,
    /// which cancels the timer.
    pub fn attach_timeout(&self, id: RequestId, handle: TimeoutHandle) -> bool {
        match self.pending.get_mut(&id) {
            Some(mut entry) => {
                entry.timeout = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Resolve with a result value. Returns true if this call won the race.
    pub fn resolve_with_result(&self, id: RequestId, value: serde_json::Value) -> bool {
        self.resolve(id, Ok(value))
    }

    /// Resolve with an error. Returns true if this call won the race.
    pub fn resolve_with_error(&self, id: RequestId, error: RequestError) -> bool {
        self.resolve(id, Err(error))
    }

    fn resolve(&self, id: RequestId, outcome: Outcome) -> bool {
        let Some((_, entry)) = self.pending.remove(&id) else {
            debug!(request_id = %id, "Resolution for unknown or already resolved request ignored");
            return false;
        };

        let PendingRequest {
            sender,
            topic,
            method,
            created_at,
            timeout,
            ..
        } = entry;

        if let Some(timer) = timeout {
            timer.cancel();
        }

        let timed_out = matches!(outcome, Err(RequestError::Timeout { .. }));
        let elapsed = created_at.elapsed();

        if sender.send(outcome).is_err() {
            // Caller stopped waiting
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(request_id = %id, method = %method, "Pending request receiver dropped");
            return true;
        }

        if timed_out {
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
        }

        debug!(
            request_id = %id,
            topic = %topic,
            method = %method,
            timed_out = timed_out,
            response_time_ms = elapsed.as_millis() as u64,
            "Resolved pending request"
        );
        true
    }

    /// Drop an entry without resolving it. Safe to call repeatedly.
    pub fn remove(&self, id: RequestId) -> bool {
        if self.pending.remove(&id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(request_id = %id, "Removed pending request");
            true
        } else {
            false
        }
    }

    /// Resolve every entry more than `grace` past its deadline with a timeout.
    ///
    /// Only catches entries whose timer never fired (e.g. the runtime dropped
    /// the task). Returns the number of entries this call resolved.
    pub fn sweep_expired(&self, grace: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<(RequestId, String, Duration)> = self
            .pending
            .iter()
            .filter(|entry| now > entry.deadline + grace)
            .map(|entry| {
                let budget = entry.deadline.saturating_duration_since(entry.created_at);
                (*entry.key(), entry.method.clone(), budget)
            })
            .collect();

        let mut resolved = 0;
        for (id, method, budget) in expired {
            warn!(
                request_id = %id,
                method = %method,
                "Sweeping pending request past its deadline"
            );
            if self.resolve_with_error(id, RequestError::timed_out(method, budget)) {
                resolved += 1;
            }
        }
        resolved
    }

    /// Topic the pending request was sent on.
    pub fn topic_of(&self, id: &RequestId) -> Option<Topic> {
        self.pending.get(id).map(|entry| entry.topic.clone())
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a request id is pending
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingRequestTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that periodically sweeps entries past their deadline.
pub async fn cleanup_task(table: Arc<PendingRequestTable>, interval: Duration, grace: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let swept = table.sweep_expired(grace);
        if swept > 0 {
            debug!(swept = swept, "Swept expired pending requests");
        }
    }
}
