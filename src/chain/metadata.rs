//! Chain metadata: endpoint tiers, network class and execution family per chain

use crate::config::{ChainConfig, ChainFamily, EndpointTiers, Settings};

use std::collections::HashMap;

/// Read-only view of the chains this process knows about
#[cfg_attr(test, mockall::automock)]
pub trait ChainMetadata: Send + Sync {
    /// Candidate RPC URL tiers, `None` if the chain is unknown
    fn endpoint_tiers(&self, chain_id: u64) -> Option<EndpointTiers>;

    /// Whether the chain is a test network
    fn is_testnet(&self, chain_id: u64) -> bool;

    /// Execution-environment family, `None` if the chain is unknown
    fn family(&self, chain_id: u64) -> Option<ChainFamily>;
}

/// Chain metadata backed by the `[chains]` section of the settings
#[derive(Debug, Clone, Default)]
pub struct ConfigChainMetadata {
    chains: HashMap<u64, ChainConfig>,
}

impl ConfigChainMetadata {
    /// Collect all enabled chains from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let chains = settings
            .enabled_chains()
            .into_iter()
            .map(|(_, chain)| (chain.chain_id, chain.clone()))
            .collect();
        Self { chains }
    }

}

impl ChainMetadata for ConfigChainMetadata {
    fn endpoint_tiers(&self, chain_id: u64) -> Option<EndpointTiers> {
        self.chains.get(&chain_id).map(|c| c.rpc.clone())
    }

    fn is_testnet(&self, chain_id: u64) -> bool {
        self.chains.get(&chain_id).map(|c| c.testnet).unwrap_or(false)
    }

    fn family(&self, chain_id: u64) -> Option<ChainFamily> {
        self.chains.get(&chain_id).map(|c| c.family)
    }
}
