//! Per-chain RPC client bound to a failover transport

use super::metadata::ChainMetadata;
use crate::config::{BatchConfig, ChainFamily, ClientConfig};
use crate::error::{OrchestratorError, OrchestratorResult, TransportError};
use crate::transport::{resolve_endpoints, BatchCall, FailoverTransport, ResponseClassifier};

use ethers::providers::{JsonRpcClient, JsonRpcError, Middleware, Provider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// RPC client for a single chain
pub struct ChainClient {
    /// Chain ID
    chain_id: u64,
    /// Provider over the chain's failover transport
    provider: Provider<FailoverTransport>,
    /// Batched-call aggregation settings
    batch: BatchConfig,
}

impl ChainClient {
    /// Get chain ID
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the underlying provider
    pub fn provider(&self) -> &Provider<FailoverTransport> {
        &self.provider
    }

    /// Get the failover transport
    pub fn transport(&self) -> &FailoverTransport {
        self.provider.as_ref()
    }

    /// Endpoint candidates in the order they are attempted
    pub fn endpoints(&self) -> &[String] {
        self.transport().endpoints()
    }

    pub fn polling_interval(&self) -> Duration {
        self.provider.get_interval()
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch
    }

    /// Get current block number
    pub async fn block_number(&self) -> OrchestratorResult<u64> {
        let block = self.provider.get_block_number().await?;
        Ok(block.as_u64())
    }

    /// Issue several calls, aggregated into JSON-RPC batches when batching is enabled.
    ///
    /// Results keep call order. JSON-RPC errors are reported per call; a
    /// transport failure fails the whole operation.
    pub async fn batch_call(
        &self,
        calls: &[BatchCall],
    ) -> OrchestratorResult<Vec<Result<Value, JsonRpcError>>> {
        let mut results = Vec::with_capacity(calls.len());

        if self.batch.enabled {
            for chunk in calls.chunks(self.batch.max_batch_size.max(1)) {
                debug!(
                    "Sending batch of {} calls to chain {}",
                    chunk.len(),
                    self.chain_id
                );
                results.extend(self.transport().request_batch(chunk).await?);
            }
            return Ok(results);
        }

        for call in calls {
            let result = self
                .transport()
                .request::<_, Value>(&call.method, &call.params)
                .await;
            match result {
                Ok(value) => results.push(Ok(value)),
                Err(TransportError::JsonRpc(e)) => results.push(Err(e)),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(results)
    }

    /// Health check
    pub async fn health_check(&self) -> bool {
        match self.block_number().await {
            Ok(block) => {
                debug!("Chain {} healthy at block {}", self.chain_id, block);
                true
            }
            Err(e) => {
                error!("Health check failed for chain {}: {}", self.chain_id, e);
                false
            }
        }
    }
}

/// Build a client for `chain_id` over its resolved endpoint candidates
pub fn build_client(
    chain_id: u64,
    metadata: &dyn ChainMetadata,
    classifier: Arc<dyn ResponseClassifier>,
    config: &ClientConfig,
    http: reqwest::Client,
) -> OrchestratorResult<ChainClient> {
    let tiers = metadata
        .endpoint_tiers(chain_id)
        .ok_or(OrchestratorError::ChainNotFound { chain_id })?;

    if metadata.family(chain_id) != Some(ChainFamily::Evm) {
        return Err(OrchestratorError::UnsupportedChainFamily { chain_id });
    }

    let endpoints = resolve_endpoints(&tiers);
    if endpoints.is_empty() {
        return Err(OrchestratorError::NoEndpoints { chain_id });
    }

    info!(
        "Building client for chain {} with {} endpoint(s)",
        chain_id,
        endpoints.len()
    );

    let transport = FailoverTransport::new(chain_id, endpoints, http, classifier);
    let provider = Provider::new(transport).interval(config.polling_interval());

    Ok(ChainClient {
        chain_id,
        provider,
        batch: config.batch.clone(),
    })
}
