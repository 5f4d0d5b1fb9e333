//! Adapters implementing the outbound ports.

pub mod relay_transport;
pub mod session_store;

pub use relay_transport::{RelayReceiver, RelayTransport};
pub use session_store::InMemorySessionStore;
