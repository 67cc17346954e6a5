//! Transaction recording module: records, recorder, and an in-memory store

pub mod memory;
pub mod record;
pub mod recorder;

pub use memory::MemoryTransactionStore;
pub use record::{
    OrderQueueStatus, Routing, SwapAmounts, SwapTransactionInfo, TransactionOrigin,
    TransactionRecord, TransactionStatus,
};
#[cfg(test)]
pub use recorder::{MockTransactionStore, MockTransactionTracker};
pub use recorder::{TransactionRecorder, TransactionStore, TransactionTracker};
