//! JSON-RPC 2.0 envelopes.
//!
//! Responses are untagged on the wire: an object carrying `result` is a
//! success, one carrying `error` is a failure.

use crate::request_id::RequestId;
use serde::{Deserialize, Serialize};

/// Protocol version string carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Code used when an error is built from a bare message.
pub const DEFAULT_ERROR_CODE: i64 = -32000;

fn jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// A JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: RequestId,
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            id,
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params,
        }
    }
}

/// Error object inside a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Successful JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResult {
    pub id: RequestId,
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub result: serde_json::Value,
}

/// Failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub id: RequestId,
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub error: JsonRpcErrorObject,
}

/// Either kind of JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponse {
    Result(JsonRpcResult),
    Error(JsonRpcError),
}

impl JsonRpcResponse {
    /// Build a success response.
    pub fn result(id: RequestId, result: serde_json::Value) -> Self {
        Self::Result(JsonRpcResult {
            id,
            jsonrpc: jsonrpc_version(),
            result,
        })
    }

    /// Build an error response from a bare message using the generic server code.
    pub fn error(id: RequestId, message: impl Into<String>) -> Self {
        Self::error_object(id, JsonRpcErrorObject::new(DEFAULT_ERROR_CODE, message))
    }

    pub fn error_object(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self::Error(JsonRpcError {
            id,
            jsonrpc: jsonrpc_version(),
            error,
        })
    }

    pub fn id(&self) -> RequestId {
        match self {
            Self::Result(r) => r.id,
            Self::Error(e) => e.id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
