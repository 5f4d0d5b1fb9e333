//! Outbound (Driven) ports for the session RPC engine.
//!
//! Collaborators the engine depends on but does not own: the session store
//! kept by the pairing subsystem, the relay, and the clock.

use async_trait::async_trait;
use shared_types::{Session, SessionPayload, Topic};
use std::sync::atomic::{AtomicU64, Ordering};

/// Read access to settled sessions.
pub trait SessionStore: Send + Sync {
    /// Look up the settled, unexpired session for `topic`.
    ///
    /// Returns `None` rather than an error when nothing matches.
    fn lookup(&self, topic: &Topic) -> Option<Session>;
}

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Outbound half of the relay.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `payload` addressed to `topic`.
    async fn send(&self, topic: &Topic, payload: SessionPayload) -> Result<(), TransportError>;
}

/// A payload received from the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub payload: SessionPayload,
}

/// Inbound half of the relay.
#[async_trait]
pub trait InboundReceiver: Send + Sync {
    /// Receive the next message (waits until one is available).
    ///
    /// `Err(TransportError::ChannelClosed)` means no more messages will come.
    async fn receive(&self) -> Result<InboundMessage, TransportError>;
}

/// Time source for session expiry checks.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current time in unix seconds.
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch: report 0 rather than panic
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}
