//! Submission primitives for the classic and off-chain order pathways

use super::types::{
    ClassicSubmission, FeeOptions, OrderResult, PermitSignature, SlippageTolerance, Trade,
};

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicSubmitOptions {
    pub slippage: SlippageTolerance,
    pub permit: Option<PermitSignature>,
    pub fee: Option<FeeOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmitOptions {
    pub slippage: SlippageTolerance,
}

/// Builds, signs and broadcasts a router transaction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassicSubmitter: Send + Sync {
    async fn submit(
        &self,
        trade: &Trade,
        options: ClassicSubmitOptions,
    ) -> anyhow::Result<ClassicSubmission>;
}

/// Signs an order and hands it to the off-chain order service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, trade: &Trade, options: OrderSubmitOptions)
        -> anyhow::Result<OrderResult>;
}
