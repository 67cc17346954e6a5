//! In-memory transaction store using DashMap

use super::record::{SwapTransactionInfo, TransactionOrigin, TransactionRecord, TransactionStatus};
use super::recorder::{TransactionStore, TransactionTracker};

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ethers::types::{Transaction, H256, U256};
use std::sync::Arc;
use tracing::debug;

/// Records indexed by transaction or order hash.
///
/// Serves as both tracker and store for embedding applications without a
/// persistent backend.
#[derive(Clone, Default)]
pub struct MemoryTransactionStore {
    records: Arc<DashMap<H256, TransactionRecord>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &H256) -> Option<TransactionRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    /// Update the status of a tracked record, returns false if unknown
    pub fn set_status(&self, id: &H256, status: TransactionStatus) -> bool {
        match self.records.get_mut(id) {
            Some(mut record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert_new(&self, record: TransactionRecord) -> anyhow::Result<()> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => bail!("Transaction {:?} is already recorded", record.id),
            Entry::Vacant(entry) => {
                debug!("Stored transaction {:?}", record.id);
                entry.insert(record);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn append(&self, record: TransactionRecord) -> anyhow::Result<()> {
        self.insert_new(record)
    }
}

#[async_trait]
impl TransactionTracker for MemoryTransactionStore {
    async fn add(
        &self,
        response: &Transaction,
        info: SwapTransactionInfo,
        deadline: Option<u64>,
    ) -> anyhow::Result<()> {
        let chain_id = match response.chain_id {
            Some(chain_id) if chain_id <= U256::from(u64::MAX) => chain_id.as_u64(),
            Some(chain_id) => bail!(
                "Transaction {:?} has out-of-range chain ID {}",
                response.hash,
                chain_id
            ),
            None => bail!("Transaction {:?} has no chain ID", response.hash),
        };

        let record = TransactionRecord {
            id: response.hash,
            chain_id,
            from: response.from,
            status: TransactionStatus::Pending,
            added_time: Utc::now(),
            info,
            origin: TransactionOrigin::Internal,
            routing: None,
            queue_status: None,
            encoded_order: None,
            expiry: None,
            deadline,
        };
        self.insert_new(record)
    }

    async fn get_by_hash(&self, hash: H256) -> anyhow::Result<Option<TransactionRecord>> {
        Ok(self.get(&hash))
    }
}
