//! Trade and submission types

use ethers::types::{Address, Bytes, Transaction, H256, U256};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};

/// Basis points in one whole
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Asset on a specific chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub chain_id: u64,
    /// Token contract, `None` for the chain's native currency
    pub address: Option<Address>,
    pub symbol: String,
    pub decimals: u8,
}

impl Currency {
    pub fn native(chain_id: u64, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address: None,
            symbol: symbol.into(),
            decimals: 18,
        }
    }

    pub fn token(chain_id: u64, address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            chain_id,
            address: Some(address),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Stable identifier: `<chain>-<checksummed address>` or `<chain>-NATIVE`
    pub fn id(&self) -> String {
        match self.address {
            Some(address) => format!("{}-{}", self.chain_id, to_checksum(&address, None)),
            None => format!("{}-NATIVE", self.chain_id),
        }
    }
}

/// Raw integer quantity of a currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub raw: U256,
}

impl CurrencyAmount {
    pub fn new(currency: Currency, raw: impl Into<U256>) -> Self {
        Self {
            currency,
            raw: raw.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

/// Interface fee carried by a classic trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFee {
    pub recipient: Address,
    /// Fee as a share of the amount, in basis points
    pub percent_bps: u32,
    /// Absolute fee amount in output-currency units
    pub amount: U256,
}

/// Generation of the off-chain Dutch order protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderVersion {
    V1,
    V2,
}

/// Execution pathway of a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeRoute {
    /// Broadcast on-chain through the router contract
    Classic { swap_fee: Option<SwapFee> },
    /// Signed Dutch order handed to the off-chain filler network
    DutchOrder { version: OrderVersion },
    /// Off-chain order with a fixed price and an explicit expiry
    LimitOrder,
}

impl TradeRoute {
    pub fn is_offchain(&self) -> bool {
        match self {
            TradeRoute::Classic { .. } => false,
            TradeRoute::DutchOrder { .. } | TradeRoute::LimitOrder => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeRoute::Classic { .. } => "classic",
            TradeRoute::DutchOrder {
                version: OrderVersion::V1,
            } => "dutch_v1",
            TradeRoute::DutchOrder {
                version: OrderVersion::V2,
            } => "dutch_v2",
            TradeRoute::LimitOrder => "limit_order",
        }
    }
}

/// An exchange intent. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    input: CurrencyAmount,
    output: CurrencyAmount,
    trade_type: TradeType,
    route: TradeRoute,
}

impl Trade {
    pub fn new(
        input: CurrencyAmount,
        output: CurrencyAmount,
        trade_type: TradeType,
        route: TradeRoute,
    ) -> Self {
        Self {
            input,
            output,
            trade_type,
            route,
        }
    }

    pub fn classic(
        input: CurrencyAmount,
        output: CurrencyAmount,
        trade_type: TradeType,
        swap_fee: Option<SwapFee>,
    ) -> Self {
        Self::new(input, output, trade_type, TradeRoute::Classic { swap_fee })
    }

    pub fn input(&self) -> &CurrencyAmount {
        &self.input
    }

    pub fn output(&self) -> &CurrencyAmount {
        &self.output
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn route(&self) -> &TradeRoute {
        &self.route
    }

    /// The interface fee, present only on classic trades
    pub fn swap_fee(&self) -> Option<&SwapFee> {
        match &self.route {
            TradeRoute::Classic { swap_fee } => swap_fee.as_ref(),
            TradeRoute::DutchOrder { .. } | TradeRoute::LimitOrder => None,
        }
    }
}

/// Maximum acceptable adverse price movement, in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageTolerance {
    bps: u32,
}

impl SlippageTolerance {
    pub fn from_bps(bps: u32) -> Self {
        Self { bps }
    }

    /// Whole-percent tolerance, e.g. `from_percent(1)` is 1%
    pub fn from_percent(percent: u32) -> Self {
        Self::from_bps(percent.saturating_mul(100))
    }

    pub fn bps(&self) -> u32 {
        self.bps
    }

    /// `amount` reduced by the tolerance, rounded down
    pub fn minimum_amount_out(&self, amount: U256) -> U256 {
        scale_bps(amount, BPS_DENOMINATOR.saturating_sub(self.bps))
    }

    /// `amount` increased by the tolerance, rounded down
    pub fn maximum_amount_in(&self, amount: U256) -> U256 {
        scale_bps(amount, BPS_DENOMINATOR.saturating_add(self.bps))
    }
}

/// floor(amount * numerator / 10_000) without overflowing on large amounts
fn scale_bps(amount: U256, numerator: u32) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let numerator = U256::from(numerator);
    let whole = (amount / denominator).saturating_mul(numerator);
    let remainder = (amount % denominator) * numerator / denominator;
    whole.saturating_add(remainder)
}

/// Display values in fiat, attached to submissions for analytics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FiatValues {
    pub input_usd: Option<f64>,
    pub output_usd: Option<f64>,
}

/// Off-chain token approval signature, forwarded to the classic submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    pub nonce: U256,
    pub deadline: U256,
    pub signature: Bytes,
}

/// Fee descriptor for the classic router. Exactly one shape is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeOptions {
    /// Share of the output, used for exact-input trades
    Percentage { fee_bps: u32, recipient: Address },
    /// Absolute amount, used for exact-output trades
    Flat { amount: U256, recipient: Address },
}

/// Result of the classic submission primitive
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicSubmission {
    /// Provider response for the broadcast transaction
    pub response: Transaction,
    /// Router deadline in unix seconds
    pub deadline: Option<u64>,
}

/// Signed order accepted by the off-chain order service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub order_hash: H256,
    pub encoded_order: Bytes,
    /// Unix seconds after which the order can no longer be filled
    pub expiry: u64,
}

/// Result of the off-chain submission primitive, tagged by order generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderResult {
    V1(OrderSubmission),
    V2(OrderSubmission),
}

/// Outcome of one successful swap submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Classic(ClassicSubmission),
    OffchainV1(OrderSubmission),
    OffchainV2(OrderSubmission),
}

impl SubmissionResult {
    pub fn is_offchain_order(&self) -> bool {
        match self {
            SubmissionResult::Classic(_) => false,
            SubmissionResult::OffchainV1(_) | SubmissionResult::OffchainV2(_) => true,
        }
    }

    /// Transaction hash for classic results, order hash otherwise
    pub fn id(&self) -> H256 {
        match self {
            SubmissionResult::Classic(classic) => classic.response.hash,
            SubmissionResult::OffchainV1(order) | SubmissionResult::OffchainV2(order) => {
                order.order_hash
            }
        }
    }
}

impl From<OrderResult> for SubmissionResult {
    fn from(result: OrderResult) -> Self {
        match result {
            OrderResult::V1(order) => SubmissionResult::OffchainV1(order),
            OrderResult::V2(order) => SubmissionResult::OffchainV2(order),
        }
    }
}
