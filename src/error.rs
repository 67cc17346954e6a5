//! Error types for the swap orchestrator and its RPC transports

use ethers::providers::{JsonRpcError, ProviderError, RpcError};
use thiserror::Error;

/// Main error type for swap submission and chain client construction
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Missing trade")]
    MissingTrade,

    #[error("Wallet must be connected to submit a swap")]
    WalletNotConnected,

    #[error("Missing chain ID for swap")]
    MissingChain,

    #[error("Chain {chain_id} is not an EVM chain; swap submission is unsupported")]
    UnsupportedChainFamily { chain_id: u64 },

    #[error("Failed to switch wallet to chain {chain_id}: {reason}")]
    ChainSwitchFailed { chain_id: u64, reason: String },

    #[error("Wallet error: {0}")]
    Wallet(#[source] anyhow::Error),

    #[error(transparent)]
    Submission(anyhow::Error),

    #[error("Failed to record submitted transaction: {0}")]
    Recording(#[source] anyhow::Error),

    #[error("Chain {chain_id} not found")]
    ChainNotFound { chain_id: u64 },

    #[error("Chain {chain_id} has no RPC endpoints configured")]
    NoEndpoints { chain_id: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrchestratorError {
    /// Precondition failures are raised before any side effect takes place
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OrchestratorError::MissingTrade
                | OrchestratorError::WalletNotConnected
                | OrchestratorError::MissingChain
                | OrchestratorError::UnsupportedChainFamily { .. }
                | OrchestratorError::ChainSwitchFailed { .. }
        )
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::MissingTrade => "missing_trade",
            OrchestratorError::WalletNotConnected => "wallet_not_connected",
            OrchestratorError::MissingChain => "missing_chain",
            OrchestratorError::UnsupportedChainFamily { .. } => "unsupported_chain_family",
            OrchestratorError::ChainSwitchFailed { .. } => "chain_switch_failed",
            OrchestratorError::Wallet(_) => "wallet",
            OrchestratorError::Submission(_) => "submission",
            OrchestratorError::Recording(_) => "recording",
            OrchestratorError::ChainNotFound { .. } => "chain_not_found",
            OrchestratorError::NoEndpoints { .. } => "no_endpoints",
            OrchestratorError::Transport(_) => "transport",
            OrchestratorError::Provider(_) => "provider",
            OrchestratorError::Config(_) => "config",
        }
    }
}

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Errors raised by the failover JSON-RPC transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Endpoint {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to deserialize result: {0}")]
    Result(#[source] serde_json::Error),

    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),

    #[error("Batch response is missing request id {id}")]
    MissingBatchResponse { id: u64 },

    #[error("All {attempted} endpoints failed for chain {chain_id}")]
    AllEndpointsFailed {
        chain_id: u64,
        attempted: usize,
        #[source]
        last: Option<Box<TransportError>>,
    },
}

impl TransportError {
    /// Endpoint-level failures that justify moving on to the next endpoint
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(
            self,
            TransportError::Http { .. } | TransportError::Status { .. } | TransportError::Decode { .. }
        )
    }
}

impl RpcError for TransportError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            TransportError::JsonRpc(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            TransportError::Decode { source, .. } => Some(source),
            TransportError::Serialize(e) | TransportError::Result(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(src: TransportError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
