//! # Shared Types Crate
//!
//! Types shared between the relay bus and the session RPC engine.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: topics, sessions and JSON-RPC envelopes are
//!   defined once here and re-used by every crate in the workspace.
//! - **Opaque Topics**: a `Topic` is only ever compared and displayed; no
//!   structure is inferred from its contents.
//! - **Numeric Request Ids**: JSON-RPC ids are `u64`, unique per process.

pub mod jsonrpc;
pub mod payload;
pub mod request_id;
pub mod session;

pub use jsonrpc::{
    JsonRpcError, JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse, JsonRpcResult,
    JSONRPC_VERSION,
};
pub use payload::{PayloadKind, SessionPayload};
pub use request_id::RequestId;
pub use session::{Session, SessionPermissions, SessionState, Topic, TopicError};
