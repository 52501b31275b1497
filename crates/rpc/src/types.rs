//! JSON-RPC 2.0 envelope types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub(crate) const JSONRPC_VERSION: &str = "2.0";

/// A single JSON-RPC request before an id has been assigned to it
///
/// Ids are allocated by the client at dispatch time, so the same `Request` value can be reused
/// across calls and batches.
#[derive(Clone, Debug)]
pub struct Request {
    /// Method name
    pub method: String,
    /// Positional parameters
    pub params: Vec<Value>,
}

impl Request {
    /// Create a new `Request` with the given method and positional parameters
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self { method: method.into(), params }
    }
}

/// A JSON-RPC error object returned by the remote side
///
/// The code, message, and data are surfaced verbatim so callers can branch on standard Ethereum
/// and bundler error codes.
#[derive(Clone, Debug, Error, Serialize, Deserialize)]
#[error("json-rpc error (code: {code}, message: {message})")]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Wire form of a single request, borrowed from a [Request](Request) and an allocated id
#[derive(Debug, Serialize)]
pub(crate) struct RequestEnvelope<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a [Value],
    pub id: u64,
}

impl<'a> RequestEnvelope<'a> {
    pub(crate) fn new(request: &'a Request, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, method: &request.method, params: &request.params, id }
    }
}

/// Wire form of a single response
///
/// Deserialization fails for bodies that carry neither a `result` nor an `error` member, which
/// the client classifies as a decode error.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseEnvelope {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Either member of a response; the error variant wins when both are present
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResponsePayload {
    Error { error: JsonRpcError },
    Success { result: Value },
}
