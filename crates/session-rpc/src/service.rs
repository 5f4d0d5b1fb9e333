//! Session RPC client service.
//!
//! Wires the session store, transport, pending table, dispatcher and router
//! together and owns the background tasks (inbound loop and deadline sweep).

use crate::adapters::{InMemorySessionStore, RelayTransport};
use crate::correlation::{cleanup_task, PendingRequestTable, PendingStats, ResponseRouter};
use crate::dispatcher::RequestDispatcher;
use crate::domain::config::{ClientConfig, ConfigError};
use crate::domain::error::{RequestError, RequestResult};
use crate::ports::{
    IncomingRequest, InboundReceiver, RequestParams, SessionRpcApi, SessionStore, Transport,
};
use async_trait::async_trait;
use relay_bus::InMemoryRelay;
use shared_types::{JsonRpcResponse, SessionPayload, Topic};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A session peer able to both send and answer requests.
pub struct SessionRpcClient {
    config: ClientConfig,
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    pending: Arc<PendingRequestTable>,
    dispatcher: RequestDispatcher,
    router: Arc<ResponseRouter>,
    incoming_rx: Mutex<mpsc::Receiver<IncomingRequest>>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl SessionRpcClient {
    /// Build a client. Background tasks start with [`start`](Self::start).
    pub fn new(
        config: ClientConfig,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let pending = Arc::new(PendingRequestTable::new());
        let (incoming_tx, incoming_rx) = mpsc::channel(config.relay.incoming_buffer);
        let dispatcher = RequestDispatcher::new(
            Arc::clone(&sessions),
            Arc::clone(&transport),
            Arc::clone(&pending),
            config.request.default_timeout,
        );
        let router = Arc::new(ResponseRouter::new(
            Arc::clone(&pending),
            Arc::clone(&sessions),
            Arc::clone(&transport),
            incoming_tx,
        ));

        Ok(Self {
            config,
            sessions,
            transport,
            pending,
            dispatcher,
            router,
            incoming_rx: Mutex::new(incoming_rx),
            tasks: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// Build and start a client attached to `relay`.
    ///
    /// Subscribes before returning, so no response to a request sent through
    /// this client can be missed.
    pub fn connect_relay(
        config: ClientConfig,
        sessions: Arc<InMemorySessionStore>,
        relay: Arc<InMemoryRelay>,
    ) -> Result<Self, ConfigError> {
        let transport = Arc::new(RelayTransport::new(relay));
        let receiver = Arc::new(transport.receiver());
        let client = Self::new(config, sessions, transport)?;
        client.start(receiver);
        Ok(client)
    }

    /// Spawn the inbound loop and the pending-table sweep.
    pub fn start(&self, receiver: Arc<dyn InboundReceiver>) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            warn!("Session RPC client already started");
            return;
        }

        tasks.push(tokio::spawn(Arc::clone(&self.router).run(receiver)));
        tasks.push(tokio::spawn(cleanup_task(
            Arc::clone(&self.pending),
            self.config.pending.cleanup_interval,
            self.config.pending.sweep_grace,
        )));

        info!(
            default_timeout_ms = self.config.request.default_timeout.as_millis() as u64,
            "Session RPC client started"
        );
    }

    /// Abort background tasks. Requests already waiting still resolve by
    /// their own timers.
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            task.abort();
        }
        info!("Session RPC client stopped");
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().iter().any(|task| !task.is_finished())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Requests currently awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    pub fn stats(&self) -> &PendingStats {
        self.pending.stats()
    }
}

impl Drop for SessionRpcClient {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

#[async_trait]
impl SessionRpcApi for SessionRpcClient {
    async fn request(&self, params: RequestParams) -> RequestResult<serde_json::Value> {
        self.dispatcher.request(params).await
    }

    async fn next_request(&self) -> Option<IncomingRequest> {
        self.incoming_rx.lock().await.recv().await
    }

    async fn respond(&self, topic: &Topic, response: JsonRpcResponse) -> RequestResult<()> {
        if self.sessions.lookup(topic).is_none() {
            return Err(RequestError::session_not_found(topic));
        }

        debug!(topic = %topic, request_id = %response.id(), is_error = response.is_error(), "Sending response");
        self.transport
            .send(topic, SessionPayload::response(response))
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))
    }
}
