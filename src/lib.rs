//! Swap Orchestrator - multi-chain swap submission over failover RPC transports
//!
//! Validates swap preconditions, moves the wallet to the swap's chain, dispatches
//! the trade to the classic or off-chain order pathway, and records the result.
//! Each chain is reached through a client whose transport fails over across a
//! prioritized list of RPC endpoints.

pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod swap;
pub mod telemetry;
pub mod transport;
pub mod tx;

pub use chain::{ChainClient, ChainClientRegistry, ChainMetadata, ConfigChainMetadata};
pub use config::Settings;
pub use error::{OrchestratorError, OrchestratorResult, TransportError};
pub use swap::{SwapOrchestrator, SwapRequest};
pub use transport::{resolve_endpoints, FailoverTransport};
pub use tx::{MemoryTransactionStore, TransactionRecorder};
