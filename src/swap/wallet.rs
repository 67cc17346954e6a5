//! Wallet collaborators: account state and chain switching

use async_trait::async_trait;
use ethers::types::Address;

/// Snapshot of the connected wallet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletAccount {
    pub connected: bool,
    pub address: Option<Address>,
    /// Chain the wallet is currently on
    pub chain_id: Option<u64>,
}

impl WalletAccount {
    pub fn connected(address: Address, chain_id: u64) -> Self {
        Self {
            connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }

    /// Signing address, if the wallet is connected with a non-empty address
    pub fn signer(&self) -> Option<Address> {
        if !self.connected {
            return None;
        }
        self.address.filter(|a| !a.is_zero())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletState: Send + Sync {
    async fn account(&self) -> anyhow::Result<WalletAccount>;
}

/// Asks the wallet to move to another chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainSwitcher: Send + Sync {
    /// Returns the chain the wallet ended up on, `None` if the request was dismissed
    async fn switch_chain(&self, chain_id: u64) -> anyhow::Result<Option<u64>>;
}
