//! Request Dispatcher - the requester side of a session.
//!
//! Turns a caller's request into exactly one outcome:
//!
//! 1. Look up the settled session for the topic
//! 2. Check the method (and chain) against the session permissions
//! 3. Register a pending entry and arm its deadline timer
//! 4. Send the request over the transport
//! 5. Await the entry's resolution (response or timeout)
//!
//! Steps 1 and 2 fail fast and nothing is sent. No retries are made.

use crate::correlation::{PendingRequestTable, TimeoutScheduler};
use crate::domain::config::MAX_REQUEST_TIMEOUT;
use crate::domain::error::{RequestError, RequestResult};
use crate::domain::permissions::authorize;
use crate::ports::{RequestParams, SessionStore, Transport};
use shared_types::{JsonRpcRequest, RequestId, SessionPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Sends requests and waits for their correlated outcome.
pub struct RequestDispatcher {
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    pending: Arc<PendingRequestTable>,
    scheduler: TimeoutScheduler,
    default_timeout: Duration,
}

impl RequestDispatcher {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        pending: Arc<PendingRequestTable>,
        default_timeout: Duration,
    ) -> Self {
        let scheduler = TimeoutScheduler::new(&pending);
        Self {
            sessions,
            transport,
            pending,
            scheduler,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Send a request and wait for its result.
    pub async fn request(&self, params: RequestParams) -> RequestResult<serde_json::Value> {
        let RequestParams {
            topic,
            chain_id,
            request,
            timeout,
        } = params;

        let session = self
            .sessions
            .lookup(&topic)
            .ok_or_else(|| RequestError::session_not_found(&topic))?;

        if let Err(e) = authorize(&session, &request.method, chain_id.as_deref()) {
            warn!(topic = %topic, method = %request.method, error = %e, "Request rejected");
            return Err(e);
        }

        let requested = timeout.unwrap_or(self.default_timeout);
        let timeout = requested.min(MAX_REQUEST_TIMEOUT);
        if timeout < requested {
            debug!(
                method = %request.method,
                requested_ms = requested.as_millis() as u64,
                "Clamping request timeout to the maximum"
            );
        }
        let id = RequestId::next();
        let handle = self
            .pending
            .register(id, &topic, &request.method, Instant::now() + timeout)?;
        let timer = self.scheduler.arm(id, &request.method, timeout);
        self.pending.attach_timeout(id, timer);

        debug!(
            request_id = %id,
            topic = %topic,
            method = %request.method,
            chain_id = chain_id.as_deref().unwrap_or("-"),
            "Sending JSON-RPC request"
        );

        let payload = SessionPayload::request(
            chain_id,
            JsonRpcRequest::new(id, request.method, request.params),
        );
        if let Err(e) = self.transport.send(&topic, payload).await {
            warn!(request_id = %id, topic = %topic, error = %e, "Failed to send request");
            self.pending.remove(id);
            return Err(RequestError::Transport(e.to_string()));
        }

        handle.wait().await
    }
}
