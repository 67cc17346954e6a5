//! Swap submission: preconditions, chain switch, route dispatch and recording

use super::normalize::{fee_options, swap_transaction_info};
use super::submit::{ClassicSubmitOptions, ClassicSubmitter, OrderSubmitOptions, OrderSubmitter};
use super::types::{
    FiatValues, PermitSignature, SlippageTolerance, SubmissionResult, Trade, TradeRoute,
};
use super::wallet::{ChainSwitcher, WalletState};
use crate::chain::ChainMetadata;
use crate::config::ChainFamily;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::metrics;
use crate::tx::{TransactionRecorder, TransactionStatus};

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything needed to submit one swap
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub trade: Option<Trade>,
    /// Chain the swap executes on
    pub chain_id: Option<u64>,
    pub slippage: SlippageTolerance,
    pub fiat_values: FiatValues,
    pub permit: Option<PermitSignature>,
}

/// Coordinates a swap from precondition checks to the recorded transaction
pub struct SwapOrchestrator {
    wallet: Arc<dyn WalletState>,
    switcher: Arc<dyn ChainSwitcher>,
    classic: Arc<dyn ClassicSubmitter>,
    orders: Arc<dyn OrderSubmitter>,
    metadata: Arc<dyn ChainMetadata>,
    recorder: TransactionRecorder,
}

impl SwapOrchestrator {
    pub fn new(
        wallet: Arc<dyn WalletState>,
        switcher: Arc<dyn ChainSwitcher>,
        classic: Arc<dyn ClassicSubmitter>,
        orders: Arc<dyn OrderSubmitter>,
        metadata: Arc<dyn ChainMetadata>,
        recorder: TransactionRecorder,
    ) -> Self {
        Self {
            wallet,
            switcher,
            classic,
            orders,
            metadata,
            recorder,
        }
    }

    /// Submit a swap and record the result.
    ///
    /// Precondition failures return before any side effect. Submission and
    /// recording failures are propagated as-is; a completed chain switch is
    /// not rolled back.
    pub async fn submit_swap(&self, request: SwapRequest) -> OrchestratorResult<SubmissionResult> {
        let result = self.try_submit_swap(request).await;
        if let Err(e) = &result {
            if e.is_precondition() {
                debug!("Swap rejected: {}", e);
            } else {
                warn!("Swap submission failed: {}", e);
            }
            metrics::record_swap_rejected(e.kind());
        }
        result
    }

    /// Current status of a submitted swap, `None` when unknown
    pub async fn status(
        &self,
        result: &SubmissionResult,
    ) -> OrchestratorResult<Option<TransactionStatus>> {
        self.recorder.status(result).await
    }

    async fn try_submit_swap(&self, request: SwapRequest) -> OrchestratorResult<SubmissionResult> {
        let SwapRequest {
            trade,
            chain_id,
            slippage,
            fiat_values,
            permit,
        } = request;

        let trade = trade.ok_or(OrchestratorError::MissingTrade)?;

        let account = self.wallet.account().await.map_err(OrchestratorError::Wallet)?;
        let from = account.signer().ok_or(OrchestratorError::WalletNotConnected)?;

        let chain_id = chain_id.ok_or(OrchestratorError::MissingChain)?;
        match self.metadata.family(chain_id) {
            None => return Err(OrchestratorError::MissingChain),
            Some(ChainFamily::Evm) => {}
            Some(_) => return Err(OrchestratorError::UnsupportedChainFamily { chain_id }),
        }

        if account.chain_id != Some(chain_id) {
            self.switch_chain(account.chain_id, chain_id).await?;
        }

        info!(
            chain_id,
            route = trade.route().label(),
            input_usd = ?fiat_values.input_usd,
            output_usd = ?fiat_values.output_usd,
            "Submitting swap"
        );

        let result = match trade.route() {
            TradeRoute::Classic { .. } => {
                let options = ClassicSubmitOptions {
                    slippage,
                    permit,
                    fee: fee_options(&trade),
                };
                let submission = self
                    .classic
                    .submit(&trade, options)
                    .await
                    .map_err(OrchestratorError::Submission)?;
                SubmissionResult::Classic(submission)
            }
            TradeRoute::DutchOrder { .. } | TradeRoute::LimitOrder => self
                .orders
                .submit(&trade, OrderSubmitOptions { slippage })
                .await
                .map_err(OrchestratorError::Submission)?
                .into(),
        };

        let info = swap_transaction_info(&trade, slippage, result.is_offchain_order());
        self.recorder
            .record(chain_id, from, trade.route(), &result, info)
            .await?;

        metrics::record_swap_submitted(chain_id, trade.route().label());
        info!("Swap {:?} submitted on chain {}", result.id(), chain_id);

        Ok(result)
    }

    /// Request exactly one switch and require the wallet to land on `target`
    async fn switch_chain(&self, current: Option<u64>, target: u64) -> OrchestratorResult<()> {
        debug!("Switching wallet from chain {:?} to {}", current, target);

        let switched = self
            .switcher
            .switch_chain(target)
            .await
            .map_err(|e| OrchestratorError::ChainSwitchFailed {
                chain_id: target,
                reason: e.to_string(),
            })?;

        match switched {
            Some(chain_id) if chain_id == target => Ok(()),
            Some(chain_id) => Err(OrchestratorError::ChainSwitchFailed {
                chain_id: target,
                reason: format!("wallet is on chain {}", chain_id),
            }),
            None => Err(OrchestratorError::ChainSwitchFailed {
                chain_id: target,
                reason: "switch request was not completed".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainMetadata;
    use crate::swap::submit::{MockClassicSubmitter, MockOrderSubmitter};
    use crate::swap::types::{
        ClassicSubmission, Currency, CurrencyAmount, FeeOptions, OrderResult, OrderSubmission,
        OrderVersion, SwapFee, TradeType,
    };
    use crate::swap::wallet::{MockChainSwitcher, MockWalletState, WalletAccount};
    use crate::tx::{
        MockTransactionStore, MockTransactionTracker, OrderQueueStatus, SwapAmounts,
        TransactionRecord,
    };
    use ethers::types::{Address, Bytes, Transaction, H256, U256};
    use mockall::predicate::eq;
    use mockall::Sequence;

    const CHAIN: u64 = 1;
    const OTHER_CHAIN: u64 = 137;

    fn account() -> Address {
        Address::repeat_byte(0x11)
    }

    fn amount(raw: u64) -> CurrencyAmount {
        CurrencyAmount::new(Currency::native(CHAIN, "ETH"), raw)
    }

    fn fee() -> SwapFee {
        SwapFee {
            recipient: Address::repeat_byte(0xfe),
            percent_bps: 25,
            amount: U256::from(7),
        }
    }

    fn request(trade: Option<Trade>) -> SwapRequest {
        SwapRequest {
            trade,
            chain_id: Some(CHAIN),
            slippage: SlippageTolerance::from_percent(1),
            fiat_values: FiatValues {
                input_usd: Some(2500.0),
                output_usd: Some(2490.0),
            },
            permit: None,
        }
    }

    fn classic_submission() -> ClassicSubmission {
        ClassicSubmission {
            response: Transaction {
                hash: H256::repeat_byte(0xaa),
                from: account(),
                ..Default::default()
            },
            deadline: Some(1_700_000_000),
        }
    }

    fn order_submission() -> OrderSubmission {
        OrderSubmission {
            order_hash: H256::repeat_byte(0xbb),
            encoded_order: Bytes::from(vec![0xca, 0xfe]),
            expiry: 1_700_086_400,
        }
    }

    /// Mocks that expect no interaction unless configured
    struct Mocks {
        wallet: MockWalletState,
        switcher: MockChainSwitcher,
        classic: MockClassicSubmitter,
        orders: MockOrderSubmitter,
        metadata: MockChainMetadata,
        tracker: MockTransactionTracker,
        store: MockTransactionStore,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                wallet: MockWalletState::new(),
                switcher: MockChainSwitcher::new(),
                classic: MockClassicSubmitter::new(),
                orders: MockOrderSubmitter::new(),
                metadata: MockChainMetadata::new(),
                tracker: MockTransactionTracker::new(),
                store: MockTransactionStore::new(),
            }
        }

        /// Connected wallet on `chain_id`, known EVM chains
        fn ready(chain_id: u64) -> Self {
            let mut mocks = Self::new();
            mocks
                .wallet
                .expect_account()
                .returning(move || Ok(WalletAccount::connected(account(), chain_id)));
            mocks
                .metadata
                .expect_family()
                .returning(|_| Some(ChainFamily::Evm));
            mocks
        }

        fn build(self) -> SwapOrchestrator {
            SwapOrchestrator::new(
                Arc::new(self.wallet),
                Arc::new(self.switcher),
                Arc::new(self.classic),
                Arc::new(self.orders),
                Arc::new(self.metadata),
                TransactionRecorder::new(Arc::new(self.tracker), Arc::new(self.store)),
            )
        }
    }

    #[tokio::test]
    async fn test_missing_trade_has_no_side_effects() {
        let mut mocks = Mocks::new();
        mocks.wallet.expect_account().never();
        mocks.switcher.expect_switch_chain().never();
        mocks.classic.expect_submit().never();
        mocks.orders.expect_submit().never();
        mocks.store.expect_append().never();
        mocks.tracker.expect_add().never();

        let err = mocks.build().submit_swap(request(None)).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingTrade));
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn test_disconnected_wallet_is_rejected() {
        let mut mocks = Mocks::new();
        mocks.wallet.expect_account().returning(|| {
            Ok(WalletAccount {
                connected: false,
                address: Some(account()),
                chain_id: Some(CHAIN),
            })
        });
        mocks.switcher.expect_switch_chain().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_missing_or_unknown_chain_is_rejected() {
        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);

        let mut no_chain = request(Some(trade.clone()));
        no_chain.chain_id = None;
        let err = Mocks::ready(CHAIN).build().submit_swap(no_chain).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingChain));

        let mut mocks = Mocks::new();
        mocks
            .wallet
            .expect_account()
            .returning(|| Ok(WalletAccount::connected(account(), CHAIN)));
        mocks.metadata.expect_family().with(eq(CHAIN)).return_const(None::<ChainFamily>);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingChain));
    }

    #[tokio::test]
    async fn test_non_evm_chain_is_rejected() {
        let mut mocks = Mocks::new();
        mocks
            .wallet
            .expect_account()
            .returning(|| Ok(WalletAccount::connected(account(), CHAIN)));
        mocks
            .metadata
            .expect_family()
            .return_const(Some(ChainFamily::Svm));
        mocks.classic.expect_submit().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::UnsupportedChainFamily { chain_id: CHAIN }
        ));
    }

    #[tokio::test]
    async fn test_wrong_chain_switches_once_before_submission() {
        let mut mocks = Mocks::ready(OTHER_CHAIN);
        let mut seq = Sequence::new();
        mocks
            .switcher
            .expect_switch_chain()
            .with(eq(CHAIN))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|chain_id| Ok(Some(chain_id)));
        mocks
            .classic
            .expect_submit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(classic_submission()));
        mocks
            .tracker
            .expect_add()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let result = mocks.build().submit_swap(request(Some(trade))).await.unwrap();
        assert_eq!(result, SubmissionResult::Classic(classic_submission()));
    }

    #[tokio::test]
    async fn test_failed_switch_prevents_submission() {
        let mut mocks = Mocks::ready(OTHER_CHAIN);
        mocks
            .switcher
            .expect_switch_chain()
            .times(1)
            .returning(|_| Ok(None));
        mocks.classic.expect_submit().never();
        mocks.tracker.expect_add().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::ChainSwitchFailed { chain_id: CHAIN, .. }
        ));
    }

    #[tokio::test]
    async fn test_switch_to_another_chain_is_a_failure() {
        let mut mocks = Mocks::ready(OTHER_CHAIN);
        mocks
            .switcher
            .expect_switch_chain()
            .times(1)
            .returning(|_| Ok(Some(OTHER_CHAIN)));
        mocks.classic.expect_submit().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ChainSwitchFailed { .. }));
    }

    #[tokio::test]
    async fn test_exact_input_classic_swap() {
        let mut mocks = Mocks::ready(CHAIN);
        mocks.switcher.expect_switch_chain().never();
        mocks
            .classic
            .expect_submit()
            .withf(|_, options| {
                options.slippage == SlippageTolerance::from_percent(1)
                    && options.fee
                        == Some(FeeOptions::Percentage {
                            fee_bps: 25,
                            recipient: Address::repeat_byte(0xfe),
                        })
            })
            .times(1)
            .returning(|_, _| Ok(classic_submission()));
        mocks
            .tracker
            .expect_add()
            .withf(|response, info, deadline| {
                response.hash == H256::repeat_byte(0xaa)
                    && *deadline == Some(1_700_000_000)
                    && !info.is_offchain_order
                    && matches!(
                        info.amounts,
                        SwapAmounts::ExactInput { minimum_output_amount, .. }
                            if minimum_output_amount == U256::from(495)
                    )
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.store.expect_append().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, Some(fee()));
        mocks.build().submit_swap(request(Some(trade))).await.unwrap();
    }

    #[tokio::test]
    async fn test_exact_output_classic_swap_uses_flat_fee() {
        let mut mocks = Mocks::ready(CHAIN);
        mocks
            .classic
            .expect_submit()
            .withf(|_, options| {
                options.fee
                    == Some(FeeOptions::Flat {
                        amount: U256::from(7),
                        recipient: Address::repeat_byte(0xfe),
                    })
            })
            .times(1)
            .returning(|_, _| Ok(classic_submission()));
        mocks
            .tracker
            .expect_add()
            .withf(|_, info, _| {
                matches!(
                    info.amounts,
                    SwapAmounts::ExactOutput { maximum_input_amount, .. }
                        if maximum_input_amount == U256::from(1010)
                )
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactOutput, Some(fee()));
        mocks.build().submit_swap(request(Some(trade))).await.unwrap();
    }

    #[tokio::test]
    async fn test_limit_order_is_appended_not_tracked() {
        let mut mocks = Mocks::ready(CHAIN);
        mocks.classic.expect_submit().never();
        mocks
            .orders
            .expect_submit()
            .withf(|trade, options| {
                *trade.route() == TradeRoute::LimitOrder
                    && options.slippage == SlippageTolerance::from_percent(1)
            })
            .times(1)
            .returning(|_, _| Ok(OrderResult::V2(order_submission())));
        mocks.tracker.expect_add().never();
        mocks
            .store
            .expect_append()
            .withf(|record: &TransactionRecord| {
                record.id == H256::repeat_byte(0xbb)
                    && record.from == account()
                    && record.chain_id == CHAIN
                    && record.status == TransactionStatus::Pending
                    && record.queue_status == Some(OrderQueueStatus::Submitted)
                    && record.info.is_offchain_order
            })
            .times(1)
            .returning(|_| Ok(()));

        let trade = Trade::new(amount(1000), amount(500), TradeType::ExactInput, TradeRoute::LimitOrder);
        let result = mocks.build().submit_swap(request(Some(trade))).await.unwrap();
        assert_eq!(result, SubmissionResult::OffchainV2(order_submission()));
    }

    #[tokio::test]
    async fn test_dutch_order_is_returned_without_recording() {
        let mut mocks = Mocks::ready(CHAIN);
        mocks
            .orders
            .expect_submit()
            .times(1)
            .returning(|_, _| Ok(OrderResult::V1(order_submission())));
        mocks.tracker.expect_add().never();
        mocks.store.expect_append().never();

        let trade = Trade::new(
            amount(1000),
            amount(500),
            TradeType::ExactInput,
            TradeRoute::DutchOrder {
                version: OrderVersion::V1,
            },
        );
        let orchestrator = mocks.build();
        let result = orchestrator.submit_swap(request(Some(trade))).await.unwrap();
        assert_eq!(result, SubmissionResult::OffchainV1(order_submission()));
        assert_eq!(orchestrator.status(&result).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_submission_failure_is_propagated_without_recording() {
        let mut mocks = Mocks::ready(CHAIN);
        mocks
            .classic
            .expect_submit()
            .returning(|_, _| Err(anyhow::anyhow!("user rejected transaction")));
        mocks.tracker.expect_add().never();

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let err = mocks.build().submit_swap(request(Some(trade))).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Submission(_)));
        assert_eq!(err.to_string(), "user rejected transaction");
    }

    #[tokio::test]
    async fn test_permit_is_forwarded_to_classic_submission() {
        let permit = PermitSignature {
            token: Address::repeat_byte(0x01),
            spender: Address::repeat_byte(0x02),
            amount: U256::from(1000),
            nonce: U256::zero(),
            deadline: U256::from(1_700_000_000u64),
            signature: Bytes::from(vec![0x1b; 65]),
        };
        let expected = permit.clone();

        let mut mocks = Mocks::ready(CHAIN);
        mocks
            .classic
            .expect_submit()
            .withf(move |_, options| options.permit.as_ref() == Some(&expected))
            .times(1)
            .returning(|_, _| Ok(classic_submission()));
        mocks.tracker.expect_add().returning(|_, _, _| Ok(()));

        let trade = Trade::classic(amount(1000), amount(500), TradeType::ExactInput, None);
        let mut request = request(Some(trade));
        request.permit = Some(permit);
        mocks.build().submit_swap(request).await.unwrap();
    }
}
