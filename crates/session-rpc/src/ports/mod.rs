//! Ports layer for the session RPC engine.
//!
//! - Inbound (Driving) port: the API a session peer exposes
//! - Outbound (Driven) ports: session store, relay transport, clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
