//! Fee descriptors and normalized swap summaries

use super::types::{FeeOptions, SlippageTolerance, Trade, TradeType};
use crate::tx::record::{SwapAmounts, SwapTransactionInfo};

/// Fee descriptor for a classic trade.
///
/// Exact-input trades take a percentage of the output; exact-output trades pay
/// a flat amount. Trades without an interface fee get none.
pub fn fee_options(trade: &Trade) -> Option<FeeOptions> {
    let fee = trade.swap_fee()?;
    let options = match trade.trade_type() {
        TradeType::ExactInput => FeeOptions::Percentage {
            fee_bps: fee.percent_bps,
            recipient: fee.recipient,
        },
        TradeType::ExactOutput => FeeOptions::Flat {
            amount: fee.amount,
            recipient: fee.recipient,
        },
    };
    Some(options)
}

pub fn swap_transaction_info(
    trade: &Trade,
    slippage: SlippageTolerance,
    is_offchain_order: bool,
) -> SwapTransactionInfo {
    let input_currency_id = trade.input().currency.id();
    let output_currency_id = trade.output().currency.id();

    let amounts = match trade.trade_type() {
        TradeType::ExactInput => SwapAmounts::ExactInput {
            input_currency_id,
            output_currency_id,
            input_amount: trade.input().raw,
            expected_output_amount: trade.output().raw,
            minimum_output_amount: slippage.minimum_amount_out(trade.output().raw),
        },
        TradeType::ExactOutput => SwapAmounts::ExactOutput {
            input_currency_id,
            output_currency_id,
            output_amount: trade.output().raw,
            expected_input_amount: trade.input().raw,
            maximum_input_amount: slippage.maximum_amount_in(trade.input().raw),
        },
    };

    SwapTransactionInfo {
        amounts,
        is_offchain_order,
    }
}
