//! # Relay Publisher
//!
//! Defines the publishing side of the relay.

use crate::messages::{MessageFilter, RelayMessage};
use crate::subscriber::{MessageStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing messages to the relay.
#[async_trait]
pub trait RelayPublisher: Send + Sync {
    /// Publish a message to the relay.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the message.
    async fn publish(&self, message: RelayMessage) -> usize;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the relay.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Topic routing happens in each subscriber's [`MessageFilter`].
pub struct InMemoryRelay {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<RelayMessage>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryRelay {
    /// Create a new relay with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new relay with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: MessageFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        debug!(
            topics = ?filter.topics,
            exclude_origin = ?filter.exclude_origin,
            "New relay subscription created"
        );
        Subscription::new(receiver, filter)
    }

    /// Get a stream of messages matching a filter.
    #[must_use]
    pub fn message_stream(&self, filter: MessageFilter) -> MessageStream {
        MessageStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayPublisher for InMemoryRelay {
    async fn publish(&self, message: RelayMessage) -> usize {
        let topic = message.topic.clone();
        let origin = message.origin;
        let kind = message.payload.kind();

        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(
                    topic = %topic,
                    origin = %origin,
                    kind = ?kind,
                    receivers = receiver_count,
                    "Relay message published"
                );
                receiver_count
            }
            Err(_) => {
                warn!(
                    topic = %topic,
                    origin = %origin,
                    kind = ?kind,
                    "Relay message dropped (no receivers)"
                );
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
