//! Correlating JSON-RPC client over HTTP

use crate::{
    error::{ClientError, ClientResult},
    types::{Request, RequestEnvelope, ResponseEnvelope, ResponsePayload, JSONRPC_VERSION},
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::trace;
use url::Url;

/// Timeout applied to every network operation unless overridden
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC client for a single bundler or node endpoint
///
/// The client allocates strictly increasing request ids for the whole of its lifetime. Ids are
/// taken atomically, so concurrent calls never collide, and they are not reclaimed when a call
/// fails or times out, since the remote side may still resolve them. The underlying HTTP
/// connection pool is owned by the client and released on drop; concurrent use before that is
/// legal.
#[derive(Debug)]
pub struct RpcClient {
    /// Target endpoint
    url: Url,
    /// HTTP transport handle
    client: reqwest::Client,
    /// Headers merged into every request
    headers: HeaderMap,
    /// Deadline for every network operation
    timeout: Duration,
    /// Next request id
    id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for the given endpoint with the default configuration
    ///
    /// # Arguments
    /// * `url` - The http(s) url of the bundler or node endpoint
    ///
    /// # Returns
    /// * `Self` - A new `RpcClient` instance
    pub fn new(url: &str) -> ClientResult<Self> {
        let url =
            Url::parse(url).map_err(|err| ClientError::Transport { inner: err.to_string() })?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ClientError::Transport { inner: err.to_string() })?;
        Ok(Self {
            url,
            client,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            id: AtomicU64::new(1),
        })
    }

    /// Replaces the timeout applied to every network operation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The endpoint this client talks to
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Performs a single JSON-RPC call
    ///
    /// # Arguments
    /// * `method` - The method name
    /// * `params` - Positional parameters
    ///
    /// # Returns
    /// * `Value` - The `result` member of the response, which may be `null`
    pub async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
        let id = self.id.fetch_add(1, Ordering::SeqCst);
        trace!("Sending request {method} with id {id} to {}", self.url);

        let envelope = RequestEnvelope { jsonrpc: JSONRPC_VERSION, method, params: &params, id };
        let body = self.dispatch(&envelope).await?;
        let reply: ResponseEnvelope = serde_json::from_str(&body)
            .map_err(|err| ClientError::Decode { inner: err.to_string() })?;

        match reply.payload {
            ResponsePayload::Error { error } => {
                trace!("Request {id} failed with remote error code {}", error.code);
                Err(error.into())
            }
            ResponsePayload::Success { result } => {
                if reply.id != Some(id) {
                    return Err(ClientError::Decode {
                        inner: format!("response id {:?} does not match request id {id}", reply.id),
                    });
                }
                Ok(result)
            }
        }
    }

    /// Performs a batch of JSON-RPC calls with a single round trip
    ///
    /// The batch is all-or-nothing: one error element fails the whole call and no partial
    /// results are surfaced. An empty batch returns an empty result without any network
    /// activity.
    ///
    /// # Arguments
    /// * `requests` - The requests, in the order their results should come back
    ///
    /// # Returns
    /// * `Vec<Value>` - One `result` member per request, in request order
    pub async fn call_batch(&self, requests: &[Request]) -> ClientResult<Vec<Value>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let first = self.id.fetch_add(requests.len() as u64, Ordering::SeqCst);
        let envelopes: Vec<RequestEnvelope<'_>> = requests
            .iter()
            .zip(first..)
            .map(|(request, id)| RequestEnvelope::new(request, id))
            .collect();
        let last = first + requests.len() as u64 - 1;
        trace!(
            "Sending batch of {} requests with ids {first}..={last} to {}",
            requests.len(),
            self.url
        );

        let body = self.dispatch(&envelopes).await?;
        let replies: Vec<ResponseEnvelope> = serde_json::from_str(&body)
            .map_err(|err| ClientError::Decode { inner: err.to_string() })?;

        let mut results = HashMap::with_capacity(replies.len());
        for reply in replies {
            match reply.payload {
                ResponsePayload::Error { error } => return Err(error.into()),
                ResponsePayload::Success { result } => {
                    let id = reply.id.ok_or_else(|| ClientError::Decode {
                        inner: "batch response element without an id".into(),
                    })?;
                    if results.insert(id, result).is_some() {
                        return Err(ClientError::Decode {
                            inner: format!("duplicate id {id} in batch response"),
                        });
                    }
                }
            }
        }
        if results.len() != requests.len() {
            return Err(ClientError::Decode {
                inner: format!(
                    "batch size mismatch: sent {}, received {}",
                    requests.len(),
                    results.len()
                ),
            });
        }

        // responses may arrive in any order; map them back into request order by id
        (first..first + requests.len() as u64)
            .map(|id| {
                results.remove(&id).ok_or_else(|| ClientError::Decode {
                    inner: format!("batch response missing id {id}"),
                })
            })
            .collect()
    }

    async fn dispatch<B>(&self, body: &B) -> ClientResult<String>
    where
        B: Serialize + ?Sized,
    {
        let res = self
            .client
            .post(self.url.clone())
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        res.text().await.map_err(|err| self.classify(err))
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout { after: self.timeout }
        } else {
            ClientError::Transport { inner: err.to_string() }
        }
    }
}
