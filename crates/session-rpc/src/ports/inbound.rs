//! # Inbound Port - SessionRpcApi
//!
//! Driving port exposing the request/response API of a session peer.
//!
//! | Method | Role |
//! |--------|------|
//! | `request` | requester: send a call and await its outcome |
//! | `next_request` | responder: take the next authorized incoming call |
//! | `respond` | responder: answer an incoming call |

use crate::domain::RequestResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{JsonRpcRequest, JsonRpcResponse, Topic};
use std::time::Duration;

/// Method and params of an outbound call, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Everything the caller supplies for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub topic: Topic,
    pub chain_id: Option<String>,
    pub request: RequestArguments,
    /// Overrides the configured default deadline for this call only.
    pub timeout: Option<Duration>,
}

impl RequestParams {
    pub fn new(topic: Topic, request: RequestArguments) -> Self {
        Self {
            topic,
            chain_id: None,
            request,
            timeout: None,
        }
    }

    #[must_use]
    pub fn on_chain(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A call received from the counterparty on a settled session.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingRequest {
    pub topic: Topic,
    pub chain_id: Option<String>,
    pub request: JsonRpcRequest,
}

/// Primary API of a session peer.
///
/// # Example
///
/// ```rust,ignore
/// use session_rpc::ports::{RequestArguments, RequestParams, SessionRpcApi};
///
/// async fn accounts(client: &impl SessionRpcApi, topic: Topic) -> RequestResult<serde_json::Value> {
///     client
///         .request(RequestParams::new(topic, RequestArguments::new("eth_accounts")).on_chain("eip155:1"))
///         .await
/// }
/// ```
#[async_trait]
pub trait SessionRpcApi: Send + Sync {
    /// Send a request on a settled session and wait for its single outcome.
    async fn request(&self, params: RequestParams) -> RequestResult<serde_json::Value>;

    /// Next authorized incoming request, or `None` once the inbound loop stops.
    async fn next_request(&self) -> Option<IncomingRequest>;

    /// Answer a request received on `topic`.
    async fn respond(&self, topic: &Topic, response: JsonRpcResponse) -> RequestResult<()>;
}
