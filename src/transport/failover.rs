//! JSON-RPC transport with ordered endpoint failover
//!
//! Endpoints are attempted sequentially in priority order. A network error, a
//! non-success HTTP status or an undecodable body moves on to the next
//! endpoint; a well-formed JSON-RPC error is the node's answer and is returned
//! as is. Requests are never raced across endpoints.

use super::classify::{EndpointResponse, ResponseClassifier};
use crate::error::TransportError;

use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, JsonRpcError};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single call inside a JSON-RPC batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCall {
    pub method: String,
    pub params: Value,
}

impl BatchCall {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

#[derive(Serialize)]
struct Request<'a, T> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "is_zst")]
    params: T,
}

fn is_zst<T>(_t: &T) -> bool {
    std::mem::size_of::<T>() == 0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Response {
    Success {
        #[serde(default)]
        id: Value,
        result: Value,
    },
    Failure {
        #[serde(default)]
        id: Value,
        error: JsonRpcError,
    },
}

impl Response {
    fn id(&self) -> Option<u64> {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => id.as_u64(),
        }
    }

    fn into_result(self) -> Result<Value, JsonRpcError> {
        match self {
            Response::Success { result, .. } => Ok(result),
            Response::Failure { error, .. } => Err(error),
        }
    }
}

/// Single logical transport over a chain's prioritized endpoint list
pub struct FailoverTransport {
    chain_id: u64,
    endpoints: Vec<String>,
    http: reqwest::Client,
    classifier: Arc<dyn ResponseClassifier>,
    next_id: AtomicU64,
}

impl FailoverTransport {
    /// Create a transport over `endpoints`, attempted in the given order
    pub fn new(
        chain_id: u64,
        endpoints: Vec<String>,
        http: reqwest::Client,
        classifier: Arc<dyn ResponseClassifier>,
    ) -> Self {
        Self {
            chain_id,
            endpoints,
            http,
            classifier,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Send several calls in one JSON-RPC batch.
    ///
    /// Results are returned in call order. The batch as a whole fails over
    /// between endpoints; individual JSON-RPC errors are reported per call.
    pub async fn request_batch(
        &self,
        calls: &[BatchCall],
    ) -> Result<Vec<Result<Value, JsonRpcError>>, TransportError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let first_id = self
            .next_id
            .fetch_add(calls.len() as u64, Ordering::Relaxed);
        let requests: Vec<_> = calls
            .iter()
            .enumerate()
            .map(|(i, call)| Request {
                jsonrpc: "2.0",
                id: first_id + i as u64,
                method: &call.method,
                params: &call.params,
            })
            .collect();
        let body = serde_json::to_vec(&requests).map_err(TransportError::Serialize)?;

        let responses: Vec<Response> = self.send(body).await?;
        let mut by_id: HashMap<u64, Response> = responses
            .into_iter()
            .filter_map(|r| r.id().map(|id| (id, r)))
            .collect();

        (0..calls.len() as u64)
            .map(|offset| {
                let id = first_id + offset;
                by_id
                    .remove(&id)
                    .map(Response::into_result)
                    .ok_or(TransportError::MissingBatchResponse { id })
            })
            .collect()
    }

    /// Post `body` to each endpoint in order until one yields a decodable response
    async fn send<R: DeserializeOwned>(&self, body: Vec<u8>) -> Result<R, TransportError> {
        let mut last_error = None;

        for (attempt, url) in self.endpoints.iter().enumerate() {
            match self.post(url, attempt, body.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(
                            chain_id = self.chain_id,
                            url = %url,
                            attempt,
                            "Request served by fallback endpoint"
                        );
                    }
                    return Ok(response);
                }
                Err(e) if !e.is_endpoint_failure() => return Err(e),
                Err(e) => {
                    warn!(
                        chain_id = self.chain_id,
                        url = %url,
                        "RPC endpoint failed, trying next: {}",
                        e
                    );
                    crate::metrics::record_endpoint_failover(self.chain_id);
                    last_error = Some(e);
                }
            }
        }

        crate::metrics::record_transport_exhausted(self.chain_id);
        Err(TransportError::AllEndpointsFailed {
            chain_id: self.chain_id,
            attempted: self.endpoints.len(),
            last: last_error.map(Box::new),
        })
    }

    async fn post<R: DeserializeOwned>(
        &self,
        url: &str,
        attempt: usize,
        body: Vec<u8>,
    ) -> Result<R, TransportError> {
        debug!(chain_id = self.chain_id, url = %url, attempt, "Sending RPC request");

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| TransportError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        self.classifier.on_response(&EndpointResponse {
            chain_id: self.chain_id,
            url,
            status,
            attempt,
        });

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl fmt::Debug for FailoverTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailoverTransport")
            .field("chain_id", &self.chain_id)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl JsonRpcClient for FailoverTransport {
    type Error = TransportError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, TransportError>
    where
        T: fmt::Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let body = serde_json::to_vec(&request).map_err(TransportError::Serialize)?;

        let response: Response = self.send(body).await?;
        let result = response.into_result()?;
        serde_json::from_value(result).map_err(TransportError::Result)
    }
}
