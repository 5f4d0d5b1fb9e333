//! # Relay Bus - Topic-Addressed Message Relay
//!
//! In-process stand-in for the network relay that carries session payloads
//! between the two peers of a session.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Client A   │                    │   Client B   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Relay Bus   │          │
//!                  │  (by topic)  │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Every message is stamped with the publisher's [`OriginId`]; subscribers
//!   normally exclude their own origin so they never see their own traffic.
//! - Delivery is at-most-once per subscriber; lagging subscribers drop the
//!   oldest messages rather than blocking publishers.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod messages;
pub mod publisher;
pub mod subscriber;

pub use messages::{MessageFilter, OriginId, RelayMessage};
pub use publisher::{InMemoryRelay, RelayPublisher};
pub use subscriber::{MessageStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
