//! Payloads exchanged on a session topic.

use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::request_id::RequestId;
use serde::{Deserialize, Serialize};

/// Message body published on a session topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPayload {
    /// Outbound call from the requester.
    Request {
        #[serde(default, rename = "chainId", skip_serializing_if = "Option::is_none")]
        chain_id: Option<String>,
        request: JsonRpcRequest,
    },
    /// Answer from the responder.
    Response { response: JsonRpcResponse },
}

/// Discriminant of a [`SessionPayload`], used by relay filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Request,
    Response,
}

impl SessionPayload {
    pub fn request(chain_id: Option<String>, request: JsonRpcRequest) -> Self {
        Self::Request { chain_id, request }
    }

    pub fn response(response: JsonRpcResponse) -> Self {
        Self::Response { response }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Request { .. } => PayloadKind::Request,
            Self::Response { .. } => PayloadKind::Response,
        }
    }

    /// Id of the request this payload belongs to.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Request { request, .. } => request.id,
            Self::Response { response } => response.id(),
        }
    }
}
