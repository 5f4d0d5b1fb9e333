//! Relay bus adapter for the transport ports.
//!
//! Publishes session payloads on the shared [`InMemoryRelay`] and receives
//! everything addressed to this client, i.e. every message not published by
//! its own origin.

use crate::ports::{InboundMessage, InboundReceiver, Transport, TransportError};
use async_trait::async_trait;
use relay_bus::{InMemoryRelay, MessageFilter, OriginId, RelayMessage, RelayPublisher, Subscription};
use shared_types::{SessionPayload, Topic};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Outbound half: publishes onto the relay.
pub struct RelayTransport {
    relay: Arc<InMemoryRelay>,
    origin: OriginId,
}

impl RelayTransport {
    pub fn new(relay: Arc<InMemoryRelay>) -> Self {
        Self {
            relay,
            origin: OriginId::new(),
        }
    }

    pub fn origin(&self) -> OriginId {
        self.origin
    }

    /// Subscribe to traffic for this client.
    ///
    /// Messages published before this call are not delivered, so subscribe
    /// before sending the first request.
    pub fn receiver(&self) -> RelayReceiver {
        let filter = MessageFilter::all().excluding(self.origin);
        RelayReceiver::new(self.relay.subscribe(filter))
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn send(&self, topic: &Topic, payload: SessionPayload) -> Result<(), TransportError> {
        let request_id = payload.request_id();
        let kind = payload.kind();
        let receivers = self
            .relay
            .publish(RelayMessage::new(self.origin, topic.clone(), payload))
            .await;

        // Zero receivers is not an error: the peer may reconnect, and the
        // request deadline bounds the wait.
        debug!(topic = %topic, request_id = %request_id, kind = ?kind, receivers, "Sent session payload");
        Ok(())
    }
}

/// Inbound half: a relay subscription excluding our own origin.
pub struct RelayReceiver {
    subscription: Mutex<Subscription>,
}

impl RelayReceiver {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: Mutex::new(subscription),
        }
    }
}

#[async_trait]
impl InboundReceiver for RelayReceiver {
    async fn receive(&self) -> Result<InboundMessage, TransportError> {
        let mut subscription = self.subscription.lock().await;
        match subscription.recv().await {
            Some(message) => Ok(InboundMessage {
                topic: message.topic,
                payload: message.payload,
            }),
            None => Err(TransportError::ChannelClosed),
        }
    }
}
