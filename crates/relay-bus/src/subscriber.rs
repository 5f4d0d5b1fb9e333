//! # Relay Subscriber
//!
//! Defines the subscription side of the relay.

use crate::messages::{MessageFilter, RelayMessage};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The relay was closed.
    #[error("Relay closed")]
    Closed,
}

/// A subscription handle for receiving relay messages.
///
/// Dropping it releases the underlying broadcast receiver.
pub struct Subscription {
    receiver: broadcast::Receiver<RelayMessage>,
    filter: MessageFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<RelayMessage>, filter: MessageFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next message that matches the filter.
    ///
    /// Returns `None` once the relay has been dropped.
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next message without waiting.
    ///
    /// - `Ok(Some(message))` - a matching message was available
    /// - `Ok(None)` - nothing available right now
    /// - `Err(SubscriptionError::Closed)` - the relay was dropped
    pub fn try_recv(&mut self) -> Result<Option<RelayMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct MessageStream {
    inner: BroadcastStream<RelayMessage>,
    filter: MessageFilter,
}

impl MessageStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription { receiver, filter } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }
}

impl Stream for MessageStream {
    type Item = RelayMessage;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(message)) => {
                    if this.filter.matches(&message) {
                        return Poll::Ready(Some(message));
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    debug!(lagged = count, "Stream lagged, some messages dropped");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
