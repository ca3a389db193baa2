//! Constant-product swap quotes

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BPS_DENOMINATOR, SCALE};
use crate::domain::session::WalletSession;
use crate::shared::errors::AccountingError;
use crate::shared::units::u256_decimal;

/// Trading fee charged by the DEX contract, as `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFee {
    pub numerator: u64,
    pub denominator: u64,
}

/// 0.3%, the fee of the devnet deployment. Other deployments set `[dex] fee`.
pub const DEX_FEE: SwapFee = SwapFee {
    numerator: 3,
    denominator: 1000,
};

impl SwapFee {
    /// A fee below 100% with a non-zero denominator.
    pub fn is_valid(&self) -> bool {
        self.denominator > 0 && self.numerator < self.denominator
    }

    pub fn bps(&self) -> u64 {
        self.numerator * 10_000 / self.denominator
    }
}

/// Estimated result of swapping `amount_in` against a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    #[serde(with = "u256_decimal")]
    pub amount_in: U256,
    #[serde(with = "u256_decimal")]
    pub amount_out: U256,
    #[serde(with = "u256_decimal")]
    pub price_impact_bps: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteOutcome {
    Quoted(SwapQuote),
    /// One of the reserves is zero, no price exists yet.
    NoLiquidity,
}

impl QuoteOutcome {
    pub fn quote(&self) -> Option<&SwapQuote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::NoLiquidity => None,
        }
    }

    pub fn is_no_liquidity(&self) -> bool {
        matches!(self, QuoteOutcome::NoLiquidity)
    }
}

/// Quote a swap with the contract fee.
pub fn quote_swap(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
) -> Result<QuoteOutcome, AccountingError> {
    quote_swap_with_fee(amount_in, reserve_in, reserve_out, DEX_FEE)
}

/// Quote a swap with an explicit fee.
///
/// `amount_out = amount_in * (d - n) * reserve_out / (reserve_in * d + amount_in * (d - n))`
/// and `price_impact_bps = amount_in * 10000 / (reserve_in + amount_in)`, both
/// truncated like the contract's integer arithmetic.
pub fn quote_swap_with_fee(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee: SwapFee,
) -> Result<QuoteOutcome, AccountingError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(QuoteOutcome::NoLiquidity);
    }

    let amount_out = swap_output(amount_in, reserve_in, reserve_out, fee)?;
    let price_impact_bps = price_impact_bps(amount_in, reserve_in)?;

    debug!(%amount_in, %reserve_in, %reserve_out, %amount_out, %price_impact_bps, "swap quoted");

    Ok(QuoteOutcome::Quoted(SwapQuote {
        amount_in,
        amount_out,
        price_impact_bps,
    }))
}

/// Raw constant-product output, the local twin of the contract's `getAmountOut`.
///
/// A zero denominator is reported as an overflow, as the contract would revert.
pub fn swap_output(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee: SwapFee,
) -> Result<U256, AccountingError> {
    let overflow = || AccountingError::Overflow("swap output");

    let fee_keep = fee.denominator.checked_sub(fee.numerator).ok_or_else(overflow)?;
    let amount_in_with_fee = amount_in.checked_mul(U256::from(fee_keep)).ok_or_else(overflow)?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out).ok_or_else(overflow)?;
    let denominator = reserve_in
        .checked_mul(U256::from(fee.denominator))
        .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
        .ok_or_else(overflow)?;

    numerator.checked_div(denominator).ok_or_else(overflow)
}

fn price_impact_bps(amount_in: U256, reserve_in: U256) -> Result<U256, AccountingError> {
    let overflow = || AccountingError::Overflow("price impact");

    let numerator = amount_in.checked_mul(BPS_DENOMINATOR).ok_or_else(overflow)?;
    let denominator = reserve_in.checked_add(amount_in).ok_or_else(overflow)?;
    numerator.checked_div(denominator).ok_or_else(overflow)
}

/// Spot price of one unit of the input token in output tokens, scaled by 1e18.
///
/// `None` when either side is empty.
pub fn exchange_rate(reserve_in: U256, reserve_out: U256) -> Result<Option<U256>, AccountingError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(None);
    }
    let scaled = reserve_out
        .checked_mul(SCALE)
        .ok_or(AccountingError::Overflow("exchange rate"))?;
    Ok(Some(scaled / reserve_in))
}

/// Why the swap action is (not) available, in the order the checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapReadiness {
    NotConnected,
    WrongNetwork,
    EnterAmount,
    NoLiquidity,
    InsufficientBalance,
    NeedsApproval,
    Ready,
}

impl SwapReadiness {
    pub fn label(&self) -> &'static str {
        match self {
            SwapReadiness::NotConnected => "Connect wallet",
            SwapReadiness::WrongNetwork => "Switch network",
            SwapReadiness::EnterAmount => "Enter an amount",
            SwapReadiness::NoLiquidity => "Add liquidity first",
            SwapReadiness::InsufficientBalance => "Insufficient balance",
            SwapReadiness::NeedsApproval => "Approve token",
            SwapReadiness::Ready => "Swap",
        }
    }
}

/// Gate the swap button on session, quote, balance and allowance.
pub fn swap_readiness(
    session: &WalletSession,
    expected_chain_id: u64,
    outcome: &QuoteOutcome,
    amount_in: U256,
    balance: U256,
    allowance: U256,
) -> SwapReadiness {
    if !session.is_connected() {
        return SwapReadiness::NotConnected;
    }
    if !session.on_expected_chain(expected_chain_id) {
        return SwapReadiness::WrongNetwork;
    }
    if amount_in.is_zero() {
        return SwapReadiness::EnterAmount;
    }
    if outcome.is_no_liquidity() {
        return SwapReadiness::NoLiquidity;
    }
    if amount_in > balance {
        return SwapReadiness::InsufficientBalance;
    }
    if amount_in > allowance {
        return SwapReadiness::NeedsApproval;
    }
    SwapReadiness::Ready
}
