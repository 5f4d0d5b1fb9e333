//! Response Router - delivers inbound relay traffic.
//!
//! Responses resolve the matching pending request. Responses for ids that
//! are unknown, already resolved or timed out are expected (duplicate or late
//! network delivery) and are dropped without error.
//!
//! Requests from the counterparty are checked against the local session and
//! queued for the application. Unauthorized ones, and any that find the queue
//! full, are answered with an error immediately so the requester does not
//! wait for its deadline.

use crate::correlation::pending::PendingRequestTable;
use crate::domain::error::{codes, RequestError};
use crate::domain::permissions::authorize;
use crate::ports::{
    IncomingRequest, InboundMessage, InboundReceiver, SessionStore, Transport, TransportError,
};
use shared_types::{
    JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse, RequestId, SessionPayload, Topic,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Error message sent back when the application is not keeping up.
pub const QUEUE_FULL_MESSAGE: &str = "Incoming request queue full";

/// Routes inbound messages to pending requests and the incoming queue.
pub struct ResponseRouter {
    pending: Arc<PendingRequestTable>,
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    incoming_tx: mpsc::Sender<IncomingRequest>,
}

impl ResponseRouter {
    pub fn new(
        pending: Arc<PendingRequestTable>,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        incoming_tx: mpsc::Sender<IncomingRequest>,
    ) -> Self {
        Self {
            pending,
            sessions,
            transport,
            incoming_tx,
        }
    }

    /// Resolve the pending request matching `response`.
    ///
    /// Returns false when nothing was waiting for it.
    pub fn on_response(&self, response: JsonRpcResponse) -> bool {
        let id = response.id();
        let resolved = match response {
            JsonRpcResponse::Result(ok) => self.pending.resolve_with_result(id, ok.result),
            JsonRpcResponse::Error(err) => self
                .pending
                .resolve_with_error(id, RequestError::Remote(err.error)),
        };

        if !resolved {
            debug!(request_id = %id, "Discarding response for unknown or expired request");
        }
        resolved
    }

    /// Like [`on_response`](Self::on_response), but only when the response
    /// arrived on the topic the request was sent on.
    pub fn route_response(&self, topic: &Topic, response: JsonRpcResponse) -> bool {
        let id = response.id();
        match self.pending.topic_of(&id) {
            Some(expected) if &expected != topic => {
                warn!(
                    request_id = %id,
                    expected = %expected,
                    received = %topic,
                    "Discarding response delivered on the wrong topic"
                );
                false
            }
            _ => self.on_response(response),
        }
    }

    /// Validate an incoming request and queue it for the application.
    ///
    /// Never waits: a full queue is answered with a JSON-RPC error, and error
    /// replies are sent from their own task, so request intake cannot hold up
    /// response routing.
    pub fn on_request(&self, topic: Topic, chain_id: Option<String>, request: JsonRpcRequest) {
        let Some(session) = self.sessions.lookup(&topic) else {
            warn!(topic = %topic, request_id = %request.id, "Dropping request for unknown session");
            return;
        };

        if let Err(e) = authorize(&session, &request.method, chain_id.as_deref()) {
            warn!(
                topic = %topic,
                request_id = %request.id,
                method = %request.method,
                error = %e,
                "Rejecting unauthorized incoming request"
            );
            self.reply_error(topic, request.id, e.to_error_object());
            return;
        }

        let id = request.id;
        let incoming = IncomingRequest {
            topic,
            chain_id,
            request,
        };
        match self.incoming_tx.try_send(incoming) {
            Ok(()) => debug!(request_id = %id, "Queued incoming request"),
            Err(TrySendError::Full(incoming)) => {
                warn!(
                    topic = %incoming.topic,
                    request_id = %id,
                    method = %incoming.request.method,
                    "Incoming request queue full, rejecting request"
                );
                self.reply_error(
                    incoming.topic,
                    id,
                    JsonRpcErrorObject::new(codes::LIMIT_EXCEEDED, QUEUE_FULL_MESSAGE),
                );
            }
            Err(TrySendError::Closed(_)) => debug!(request_id = %id, "Incoming request queue closed"),
        }
    }

    fn reply_error(&self, topic: Topic, id: RequestId, error: JsonRpcErrorObject) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let response = SessionPayload::response(JsonRpcResponse::error_object(id, error));
            if let Err(e) = transport.send(&topic, response).await {
                error!(topic = %topic, request_id = %id, error = %e, "Failed to send error response");
            }
        });
    }

    /// Handle one inbound message.
    pub fn handle(&self, message: InboundMessage) {
        let InboundMessage { topic, payload } = message;
        match payload {
            SessionPayload::Response { response } => {
                self.route_response(&topic, response);
            }
            SessionPayload::Request { chain_id, request } => {
                self.on_request(topic, chain_id, request);
            }
        }
    }

    /// Run the listener loop until the receiver closes.
    pub async fn run(self: Arc<Self>, receiver: Arc<dyn InboundReceiver>) {
        info!("Response router started");
        loop {
            match receiver.receive().await {
                Ok(message) => self.handle(message),
                Err(TransportError::ChannelClosed) => {
                    warn!("Inbound channel closed, stopping response router");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving inbound message");
                }
            }
        }
    }
}
