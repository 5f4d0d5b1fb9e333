//! Session RPC - JSON-RPC request/response correlation over a relay.
//!
//! Two peers that share a settled session exchange JSON-RPC calls over a
//! publish/subscribe relay. Outbound calls are correlated to their responses
//! by request id, fail on a deadline, and are checked against the session's
//! permitted methods and chains before anything is sent.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SessionRpcClient                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  request()                      next_request() / respond()   │
//! │     │                                   ▲                    │
//! │  ┌──┴────────────────┐         ┌────────┴──────────┐         │
//! │  │ RequestDispatcher │         │  ResponseRouter   │         │
//! │  │ lookup → authorize│         │ responses → table │         │
//! │  │ → register → send │         │ requests → queue  │         │
//! │  └──┬─────────┬──────┘         └────────┬──────────┘         │
//! │     │         │                         │                    │
//! │     │  ┌──────┴──────────────────┐      │                    │
//! │     │  │  PendingRequestTable    │◄─────┘                    │
//! │     │  │  (oneshot per request)  │◄──── TimeoutScheduler     │
//! │     │  └─────────────────────────┘                           │
//! └─────┼─────────────────────────────────────▲──────────────────┘
//!       ▼                                     │
//!   Transport ───────────► relay ─────────► InboundReceiver
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use session_rpc::{ClientConfig, InMemorySessionStore, SessionRpcClient};
//! use session_rpc::ports::{RequestArguments, RequestParams, SessionRpcApi};
//!
//! let config = ClientConfig::from_env();
//! let relay = Arc::new(config.relay.build_relay());
//! let sessions = Arc::new(InMemorySessionStore::new());
//! let client = SessionRpcClient::connect_relay(config, sessions, relay)?;
//!
//! let accounts = client
//!     .request(RequestParams::new(topic, RequestArguments::new("eth_accounts")).on_chain("eip155:1"))
//!     .await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod correlation;
pub mod dispatcher;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemorySessionStore, RelayReceiver, RelayTransport};
pub use correlation::{PendingRequestTable, PendingStats, ResponseRouter, TimeoutScheduler};
pub use dispatcher::RequestDispatcher;
pub use domain::{codes, ClientConfig, ConfigError, RequestError, RequestResult};
pub use ports::{IncomingRequest, RequestArguments, RequestParams, SessionRpcApi};
pub use service::SessionRpcClient;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
