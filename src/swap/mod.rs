//! Swap module - trade types, submission collaborators and the orchestrator

pub mod normalize;
pub mod orchestrator;
pub mod submit;
pub mod types;
pub mod wallet;

pub use normalize::{fee_options, swap_transaction_info};
pub use orchestrator::{SwapOrchestrator, SwapRequest};
pub use submit::{ClassicSubmitOptions, ClassicSubmitter, OrderSubmitOptions, OrderSubmitter};
pub use types::{
    ClassicSubmission, Currency, CurrencyAmount, FeeOptions, FiatValues, OrderResult,
    OrderSubmission, OrderVersion, PermitSignature, SlippageTolerance, SubmissionResult, SwapFee,
    Trade, TradeRoute, TradeType,
};
pub use wallet::{ChainSwitcher, WalletAccount, WalletState};
