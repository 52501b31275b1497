use crate::types::JsonRpcError;
use std::time::Duration;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// JSON-RPC client error
///
/// Failures abort only the call that produced them; the client's id counter is never rolled
/// back, so an id consumed by a failed call is not reused even if the remote side still
/// resolves it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint replied with a non-success HTTP status; the body is carried as diagnostic
    /// payload and is not interpreted as a JSON-RPC response
    #[error("http error: status {status}")]
    Http {
        /// The HTTP status code
        status: u16,
        /// The raw response body
        body: String,
    },

    /// The configured deadline elapsed before the response arrived
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The configured timeout
        after: Duration,
    },

    /// Connection or request failure below the HTTP layer
    #[error("transport error: {inner}")]
    Transport {
        /// The inner error message
        inner: String,
    },

    /// Well-formed JSON-RPC error object from the remote side, surfaced verbatim
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),

    /// Response body is not valid JSON or lacks required members
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },
}
