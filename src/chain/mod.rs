//! Chain module - per-chain RPC clients and their process-wide registry
//!
//! This module provides:
//! - Chain metadata (endpoint tiers, testnet flag, execution family)
//! - Client construction over the failover transport
//! - A registry that builds each chain's client on first access and reuses it

pub mod metadata;
pub mod provider;

#[cfg(test)]
pub use metadata::MockChainMetadata;
pub use metadata::{ChainMetadata, ConfigChainMetadata};
pub use provider::{build_client, ChainClient};

use crate::config::{ClientConfig, Settings};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::transport::{ResponseClassifier, StatusClassifier};

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns one client per chain for the lifetime of the process
pub struct ChainClientRegistry {
    /// Chain metadata provider
    metadata: Arc<dyn ChainMetadata>,
    /// Classifier shared by every transport
    classifier: Arc<dyn ResponseClassifier>,
    /// Client settings
    config: ClientConfig,
    /// Shared HTTP connection pool
    http: reqwest::Client,
    /// Clients indexed by chain ID
    clients: DashMap<u64, Arc<ChainClient>>,
}

impl ChainClientRegistry {
    /// Create a registry with an injected response classifier
    pub fn new(
        metadata: Arc<dyn ChainMetadata>,
        classifier: Arc<dyn ResponseClassifier>,
        config: ClientConfig,
    ) -> OrchestratorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| OrchestratorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            metadata,
            classifier,
            config,
            http,
            clients: DashMap::new(),
        })
    }

    /// Create a registry from settings, reporting endpoint diagnostics through `tracing`
    pub fn from_settings(settings: &Settings) -> OrchestratorResult<Self> {
        let metadata: Arc<dyn ChainMetadata> = Arc::new(ConfigChainMetadata::from_settings(settings));
        let classifier = Arc::new(StatusClassifier::with_tracing(metadata.clone()));
        Self::new(metadata, classifier, settings.client.clone())
    }

    /// Get the client for a chain, building it on first access
    pub fn client(&self, chain_id: u64) -> OrchestratorResult<Arc<ChainClient>> {
        if let Some(client) = self.clients.get(&chain_id) {
            return Ok(client.clone());
        }

        let client = self.clients.entry(chain_id).or_try_insert_with(|| {
            debug!("Creating client for chain {}", chain_id);
            build_client(
                chain_id,
                self.metadata.as_ref(),
                self.classifier.clone(),
                &self.config,
                self.http.clone(),
            )
            .map(Arc::new)
        })?;

        Ok(client.clone())
    }

    /// Chains whose client has been built
    pub fn connected_chains(&self) -> Vec<u64> {
        self.clients.iter().map(|e| *e.key()).collect()
    }

    /// Health check for all built clients
    pub async fn health_check(&self) -> Vec<(u64, bool)> {
        let clients: Vec<Arc<ChainClient>> =
            self.clients.iter().map(|e| e.value().clone()).collect();

        let checks = clients.iter().map(|client| async move {
            let healthy = client.health_check().await;
            crate::metrics::record_chain_health(client.chain_id(), healthy);
            (client.chain_id(), healthy)
        });

        futures::future::join_all(checks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainFamily, EndpointTiers};
    use crate::transport::EndpointResponse;

    struct NoopClassifier;

    impl ResponseClassifier for NoopClassifier {
        fn on_response(&self, _response: &EndpointResponse<'_>) {}
    }

    fn registry(metadata: MockChainMetadata) -> ChainClientRegistry {
        ChainClientRegistry::new(
            Arc::new(metadata),
            Arc::new(NoopClassifier),
            ClientConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_client_is_built_once_per_chain() {
        let mut metadata = MockChainMetadata::new();
        metadata
            .expect_endpoint_tiers()
            .times(2)
            .returning(|chain_id| {
                Some(EndpointTiers {
                    default: Some(vec![format!("https://rpc-{}.example", chain_id)]),
                    ..Default::default()
                })
            });
        metadata.expect_family().return_const(Some(ChainFamily::Evm));

        let registry = registry(metadata);
        let first = registry.client(1).unwrap();
        let again = registry.client(1).unwrap();
        let other = registry.client(137).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.endpoints(), ["https://rpc-137.example"]);

        let mut chains = registry.connected_chains();
        chains.sort_unstable();
        assert_eq!(chains, vec![1, 137]);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let mut metadata = MockChainMetadata::new();
        metadata.expect_endpoint_tiers().times(2).returning(|_| None);

        let registry = registry(metadata);
        assert!(matches!(
            registry.client(42),
            Err(OrchestratorError::ChainNotFound { chain_id: 42 })
        ));
        assert!(registry.client(42).is_err());
        assert!(registry.connected_chains().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_reports_each_chain() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":0,"result":"0x64"}"#)
            .create_async()
            .await;
        let url = server.url();

        let mut metadata = MockChainMetadata::new();
        metadata.expect_endpoint_tiers().returning(move |chain_id| {
            let url = if chain_id == 1 {
                url.clone()
            } else {
                "http://127.0.0.1:1".to_string()
            };
            Some(EndpointTiers {
                public: Some(vec![url]),
                ..Default::default()
            })
        });
        metadata.expect_family().return_const(Some(ChainFamily::Evm));

        let registry = registry(metadata);
        registry.client(1).unwrap();
        registry.client(2).unwrap();

        let mut health = registry.health_check().await;
        health.sort_unstable();
        assert_eq!(health, vec![(1, true), (2, false)]);
    }
}
