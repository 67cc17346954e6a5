//! Hands submission results to the tracking subsystem and the transaction store

use super::record::{SwapTransactionInfo, TransactionRecord, TransactionStatus};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::swap::types::{SubmissionResult, TradeRoute};

use async_trait::async_trait;
use ethers::types::{Address, Transaction, H256};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracking subsystem that follows broadcast transactions until they settle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionTracker: Send + Sync {
    /// Start tracking a broadcast transaction
    async fn add(
        &self,
        response: &Transaction,
        info: SwapTransactionInfo,
        deadline: Option<u64>,
    ) -> anyhow::Result<()>;

    async fn get_by_hash(&self, hash: H256) -> anyhow::Result<Option<TransactionRecord>>;
}

/// Append-only store of transaction records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn append(&self, record: TransactionRecord) -> anyhow::Result<()>;
}

/// Writes exactly one record per successful submission that needs one
#[derive(Clone)]
pub struct TransactionRecorder {
    tracker: Arc<dyn TransactionTracker>,
    store: Arc<dyn TransactionStore>,
}

impl TransactionRecorder {
    pub fn new(tracker: Arc<dyn TransactionTracker>, store: Arc<dyn TransactionStore>) -> Self {
        Self { tracker, store }
    }

    /// Record a submission result.
    ///
    /// Classic results go to the tracker. Off-chain results are appended to the
    /// store only for limit orders; Dutch orders are tracked by the order service.
    pub async fn record(
        &self,
        chain_id: u64,
        from: Address,
        route: &TradeRoute,
        result: &SubmissionResult,
        info: SwapTransactionInfo,
    ) -> OrchestratorResult<()> {
        match result {
            SubmissionResult::Classic(classic) => {
                self.tracker
                    .add(&classic.response, info, classic.deadline)
                    .await
                    .map_err(OrchestratorError::Recording)?;
                debug!("Tracking transaction {:?} on chain {}", classic.response.hash, chain_id);
            }
            SubmissionResult::OffchainV1(order) | SubmissionResult::OffchainV2(order) => {
                if !matches!(route, TradeRoute::LimitOrder) {
                    debug!("Order {:?} is tracked by the order service", order.order_hash);
                    return Ok(());
                }

                let record = TransactionRecord::limit_order(
                    order.order_hash,
                    chain_id,
                    from,
                    info,
                    order.encoded_order.clone(),
                    order.expiry,
                );
                self.store
                    .append(record)
                    .await
                    .map_err(OrchestratorError::Recording)?;
                info!(
                    "Recorded limit order {:?} on chain {} (expires at {})",
                    order.order_hash, chain_id, order.expiry
                );
            }
        }

        Ok(())
    }

    /// Current status of a submission, `None` when unknown.
    ///
    /// Only classic transactions are looked up; off-chain orders always report unknown.
    pub async fn status(
        &self,
        result: &SubmissionResult,
    ) -> OrchestratorResult<Option<TransactionStatus>> {
        match result {
            SubmissionResult::Classic(classic) => {
                let record = self
                    .tracker
                    .get_by_hash(classic.response.hash)
                    .await
                    .map_err(OrchestratorError::Recording)?;
                Ok(record.map(|r| r.status))
            }
            SubmissionResult::OffchainV1(_) | SubmissionResult::OffchainV2(_) => Ok(None),
        }
    }
}
