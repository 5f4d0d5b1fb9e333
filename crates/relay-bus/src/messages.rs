//! # Relay Messages
//!
//! Envelope carried by the relay and the filters subscribers apply to it.

use serde::{Deserialize, Serialize};
use shared_types::{PayloadKind, SessionPayload, Topic};
use std::fmt;
use uuid::Uuid;

/// Identity of a publisher on the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(Uuid);

impl OriginId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OriginId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payload published on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Publisher of this message.
    pub origin: OriginId,
    /// Session topic the message is addressed to.
    pub topic: Topic,
    pub payload: SessionPayload,
}

impl RelayMessage {
    pub fn new(origin: OriginId, topic: Topic, payload: SessionPayload) -> Self {
        Self {
            origin,
            topic,
            payload,
        }
    }
}

/// Filter for subscribing to a subset of relay traffic.
///
/// Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Topics to receive.
    pub topics: Vec<Topic>,
    /// Payload kinds to receive.
    pub kinds: Vec<PayloadKind>,
    /// Origin whose messages are skipped (usually the subscriber itself).
    pub exclude_origin: Option<OriginId>,
}

impl MessageFilter {
    /// Create a filter that matches all messages.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Restrict to the given payload kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<PayloadKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Skip messages published by `origin`.
    #[must_use]
    pub fn excluding(mut self, origin: OriginId) -> Self {
        self.exclude_origin = Some(origin);
        self
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &RelayMessage) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&message.topic);
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&message.payload.kind());
        let origin_match = self.exclude_origin != Some(message.origin);

        topic_match && kind_match && origin_match
    }
}
