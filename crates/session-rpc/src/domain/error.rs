//! Request error types with JSON-RPC error codes.
//!
//! Display strings are part of the caller-facing contract: callers match on
//! them, so they must not change.

use shared_types::{JsonRpcErrorObject, RequestId, Topic};
use std::time::Duration;
use thiserror::Error;

/// JSON-RPC error codes used by this crate.
pub mod codes {
    // JSON-RPC 2.0 standard errors
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i64 = -32000;
    pub const LIMIT_EXCEEDED: i64 = -32005;
    pub const TIMEOUT: i64 = -32006;

    // Session errors
    pub const SESSION_NOT_FOUND: i64 = 1301;
    pub const UNAUTHORIZED_METHOD: i64 = 3001;
    pub const UNAUTHORIZED_CHAIN: i64 = 3005;
}

/// Why a request failed.
///
/// Every failure is scoped to a single request; nothing here is fatal to the
/// process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Topic does not resolve to a settled session.
    #[error("No matching session settled with topic: {topic}")]
    SessionNotFound { topic: Topic },

    /// Method not permitted by the session.
    #[error("Unauthorized JSON-RPC Method Requested: {method}")]
    UnauthorizedMethod { method: String },

    /// Chain id missing or not permitted by the session.
    #[error("Unauthorized Target ChainId Requested: {chain_id}")]
    UnauthorizedChain { chain_id: String },

    /// No response arrived before the deadline.
    #[error("JSON-RPC Request timeout after {secs}s: {method}")]
    Timeout { method: String, secs: u64 },

    /// Counterparty answered with a JSON-RPC error; message is passed through.
    #[error("{}", .0.message)]
    Remote(JsonRpcErrorObject),

    /// Transport refused the outbound envelope.
    #[error("transport send failed: {0}")]
    Transport(String),

    /// An entry with this id is already pending.
    #[error("duplicate pending request id: {0}")]
    DuplicateId(RequestId),

    /// Entry was removed before it resolved.
    #[error("pending request {0} was cancelled")]
    Cancelled(RequestId),
}

impl RequestError {
    pub fn session_not_found(topic: &Topic) -> Self {
        Self::SessionNotFound {
            topic: topic.clone(),
        }
    }

    pub fn unauthorized_method(method: impl Into<String>) -> Self {
        Self::UnauthorizedMethod {
            method: method.into(),
        }
    }

    pub fn unauthorized_chain(chain_id: impl Into<String>) -> Self {
        Self::UnauthorizedChain {
            chain_id: chain_id.into(),
        }
    }

    pub fn timeout(method: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            method: method.into(),
            secs,
        }
    }

    /// Timeout for a deadline of `budget`, reported in whole seconds rounded
    /// up so sub-second deadlines never read as "0s".
    pub fn timed_out(method: impl Into<String>, budget: Duration) -> Self {
        let secs = budget.as_secs() + u64::from(budget.subsec_nanos() > 0);
        Self::timeout(method, secs)
    }

    /// JSON-RPC code for this error.
    pub fn code(&self) -> i64 {
        match self {
            Self::SessionNotFound { .. } => codes::SESSION_NOT_FOUND,
            Self::UnauthorizedMethod { .. } => codes::UNAUTHORIZED_METHOD,
            Self::UnauthorizedChain { .. } => codes::UNAUTHORIZED_CHAIN,
            Self::Timeout { .. } => codes::TIMEOUT,
            Self::Remote(e) => e.code,
            Self::Transport(_) => codes::SERVER_ERROR,
            Self::DuplicateId(_) | Self::Cancelled(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Convert into a JSON-RPC error object suitable for a response envelope.
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            Self::Remote(e) => e.clone(),
            other => JsonRpcErrorObject::new(other.code(), other.to_string()),
        }
    }
}

impl From<JsonRpcErrorObject> for RequestError {
    fn from(error: JsonRpcErrorObject) -> Self {
        Self::Remote(error)
    }
}

/// Result type for request operations.
pub type RequestResult<T> = Result<T, RequestError>;
