//! # Session Records
//!
//! A session binds a topic to the methods and chains the counterparty agreed
//! to serve. Records are produced by the pairing subsystem; this workspace
//! only reads them.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of random bytes in a generated topic.
pub const TOPIC_BYTES: usize = 32;

/// Errors produced when parsing a topic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopicError {
    /// Topic string was empty.
    #[error("topic cannot be empty")]
    Empty,
}

/// Opaque identifier naming an established session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Wrap an existing topic string.
    pub fn new(value: impl Into<String>) -> Result<Self, TopicError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TopicError::Empty);
        }
        Ok(Self(value))
    }

    /// Generate a fresh random topic (32 bytes, hex encoded).
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOPIC_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Proposed but not yet approved by the counterparty.
    Pending,
    /// Approved; requests may flow.
    Settled,
    /// Past its expiry or explicitly ended.
    Expired,
}

/// What a session allows the requester to ask for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPermissions {
    /// Authorized JSON-RPC method names (exact match).
    pub methods: Vec<String>,
    /// Authorized chain / namespace identifiers, e.g. `eip155:1`.
    pub chains: Vec<String>,
}

impl SessionPermissions {
    pub fn new<M, C>(methods: M, chains: C) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            chains: chains.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    pub fn allows_chain(&self, chain_id: &str) -> bool {
        self.chains.iter().any(|c| c == chain_id)
    }

    /// True when requests on this session must name an authorized chain.
    pub fn is_chain_scoped(&self) -> bool {
        !self.chains.is_empty()
    }
}

/// A session record as held by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub topic: Topic,
    pub permissions: SessionPermissions,
    pub state: SessionState,
    /// Expiry as unix seconds. `0` means the session never expires.
    #[serde(default)]
    pub expiry: u64,
}

impl Session {
    /// Create a settled session with no expiry.
    pub fn settled(topic: Topic, permissions: SessionPermissions) -> Self {
        Self {
            topic,
            permissions,
            state: SessionState::Settled,
            expiry: 0,
        }
    }

    /// Builder-style expiry setter.
    #[must_use]
    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn is_settled(&self) -> bool {
        self.state == SessionState::Settled
    }

    /// Whether the session has passed its expiry at `now` (unix seconds).
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.state == SessionState::Expired || (self.expiry != 0 && now >= self.expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_topic_is_64_hex_chars() {
        let topic = Topic::generate();
        assert_eq!(topic.as_str().len(), TOPIC_BYTES * 2);
        assert!(hex::decode(topic.as_str()).is_ok());
        assert_ne!(topic, Topic::generate());
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(Topic::new(""), Err(TopicError::Empty));
    }

    #[test]
    fn test_permission_lookup_is_exact() {
        let perms = SessionPermissions::new(["eth_accounts"], ["eip155:1"]);
        assert!(perms.allows_method("eth_accounts"));
        assert!(!perms.allows_method("eth_account"));
        assert!(!perms.allows_method("ETH_ACCOUNTS"));
        assert!(perms.allows_chain("eip155:1"));
        assert!(!perms.allows_chain("eip155:10"));
    }

    #[test]
    fn test_expiry() {
        let session = Session::settled(Topic::generate(), SessionPermissions::default())
            .with_expiry(1_000);
        assert!(!session.is_expired_at(999));
        assert!(session.is_expired_at(1_000));

        let forever = Session::settled(Topic::generate(), SessionPermissions::default());
        assert!(!forever.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_session_json_shape() {
        let topic = Topic::new("abc").unwrap();
        let session = Session::settled(topic, SessionPermissions::new(["eth_sign"], ["eip155:1"]));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["topic"], "abc");
        assert_eq!(json["state"], "settled");
        assert_eq!(json["permissions"]["methods"][0], "eth_sign");
    }
}
