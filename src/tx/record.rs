//! Transaction records written after a swap submission

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a recorded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
    Expired,
}

/// Status of an order inside the off-chain order queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderQueueStatus {
    Submitted,
    Open,
    Filled,
    Expired,
    Cancelled,
    Error,
}

/// Routing tag stored with off-chain order records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    OffchainLimitOrder,
}

/// Who initiated the recorded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOrigin {
    /// Submitted from this application
    Internal,
    /// Observed on-chain, submitted elsewhere
    External,
}

/// Swap amounts tagged by trade type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trade_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapAmounts {
    ExactInput {
        input_currency_id: String,
        output_currency_id: String,
        input_amount: U256,
        expected_output_amount: U256,
        minimum_output_amount: U256,
    },
    ExactOutput {
        input_currency_id: String,
        output_currency_id: String,
        output_amount: U256,
        expected_input_amount: U256,
        maximum_input_amount: U256,
    },
}

/// Normalized description of a submitted swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapTransactionInfo {
    #[serde(flatten)]
    pub amounts: SwapAmounts,
    pub is_offchain_order: bool,
}

/// A recorded transaction or off-chain order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash, or order hash for off-chain orders
    pub id: H256,
    pub chain_id: u64,
    pub from: Address,
    pub status: TransactionStatus,
    pub added_time: DateTime<Utc>,
    pub info: SwapTransactionInfo,
    pub origin: TransactionOrigin,
    pub routing: Option<Routing>,
    pub queue_status: Option<OrderQueueStatus>,
    pub encoded_order: Option<Bytes>,
    /// Unix seconds
    pub expiry: Option<u64>,
    /// Router deadline for classic transactions, unix seconds
    pub deadline: Option<u64>,
}

impl TransactionRecord {
    /// Record for a limit order just accepted by the order service
    pub fn limit_order(
        order_hash: H256,
        chain_id: u64,
        from: Address,
        info: SwapTransactionInfo,
        encoded_order: Bytes,
        expiry: u64,
    ) -> Self {
        Self {
            id: order_hash,
            chain_id,
            from,
            status: TransactionStatus::Pending,
            added_time: Utc::now(),
            info,
            origin: TransactionOrigin::Internal,
            routing: Some(Routing::OffchainLimitOrder),
            queue_status: Some(OrderQueueStatus::Submitted),
            encoded_order: Some(encoded_order),
            expiry: Some(expiry),
            deadline: None,
        }
    }
}
