//! Liquidity withdrawal and deposit estimates

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pair::TokenPair;
use super::SCALE;
use crate::domain::session::WalletSession;
use crate::shared::errors::AccountingError;
use crate::shared::units::u256_decimal;

/// Highest share of a position withdrawn in one go. Leaves headroom for
/// rounding differences between this estimate and the contract's accounting.
pub const MAX_EFFECTIVE_PERCENTAGE: u8 = 99;

/// Share of the user's own position to withdraw, 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WithdrawalPercentage(u8);

impl WithdrawalPercentage {
    pub fn new(percentage: u8) -> Result<Self, AccountingError> {
        if (1..=100).contains(&percentage) {
            Ok(Self(percentage))
        } else {
            Err(AccountingError::InvalidPercentage(percentage))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// The percentage actually applied, capped at 99.
    pub fn effective(&self) -> u8 {
        self.0.min(MAX_EFFECTIVE_PERCENTAGE)
    }
}

impl TryFrom<u8> for WithdrawalPercentage {
    type Error = AccountingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WithdrawalPercentage> for u8 {
    fn from(value: WithdrawalPercentage) -> Self {
        value.0
    }
}

/// A user's claim on a pool, in 18-decimal liquidity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLiquidityShare {
    pub owner: Address,
    pub pair: TokenPair,
    #[serde(with = "u256_decimal")]
    pub liquidity: U256,
}

impl UserLiquidityShare {
    pub fn has_position(&self) -> bool {
        !self.liquidity.is_zero()
    }
}

/// Estimated outcome of removing liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Withdrawal {
    #[serde(with = "u256_decimal")]
    pub liquidity_to_burn: U256,
    #[serde(with = "u256_decimal")]
    pub amount_a: U256,
    #[serde(with = "u256_decimal")]
    pub amount_b: U256,
}

/// Estimate the liquidity units to burn and the tokens returned for
/// withdrawing `percentage` of `user_liquidity`.
///
/// An empty pool or a zero burn yields zero amounts; callers gate on that
/// before submitting anything.
pub fn calculate_withdrawal(
    user_liquidity: U256,
    total_liquidity: U256,
    reserve_a: U256,
    reserve_b: U256,
    percentage: WithdrawalPercentage,
) -> Result<Withdrawal, AccountingError> {
    let liquidity_to_burn = user_liquidity
        .checked_mul(U256::from(percentage.effective()))
        .ok_or(AccountingError::Overflow("liquidity to burn"))?
        / U256::from(100u64);

    if total_liquidity.is_zero() || liquidity_to_burn.is_zero() {
        return Ok(Withdrawal {
            liquidity_to_burn,
            ..Withdrawal::default()
        });
    }

    let proportion = liquidity_to_burn
        .checked_mul(SCALE)
        .ok_or(AccountingError::Overflow("withdrawal proportion"))?
        / total_liquidity;

    let share_of = |reserve: U256| {
        reserve
            .checked_mul(proportion)
            .map(|scaled| scaled / SCALE)
            .ok_or(AccountingError::Overflow("withdrawal amount"))
    };
    let amount_a = share_of(reserve_a)?;
    let amount_b = share_of(reserve_b)?;

    debug!(
        %user_liquidity,
        %total_liquidity,
        percentage = percentage.get(),
        %liquidity_to_burn,
        %amount_a,
        %amount_b,
        "withdrawal estimated"
    );

    Ok(Withdrawal {
        liquidity_to_burn,
        amount_a,
        amount_b,
    })
}

/// Amount of token B to deposit next to `amount_a` at the current pool ratio.
///
/// `None` when the pool has no price yet; the first depositor sets it.
pub fn paired_deposit_amount(
    amount_a: U256,
    reserve_a: U256,
    reserve_b: U256,
) -> Result<Option<U256>, AccountingError> {
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Ok(None);
    }
    let scaled = amount_a
        .checked_mul(reserve_b)
        .ok_or(AccountingError::Overflow("paired deposit"))?;
    Ok(Some(scaled / reserve_a))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalReadiness {
    NotConnected,
    WrongNetwork,
    NoPosition,
    NothingToBurn,
    Ready,
}

/// Gate the remove-liquidity action.
pub fn withdrawal_readiness(
    session: &WalletSession,
    expected_chain_id: u64,
    pool_has_liquidity: bool,
    user_liquidity: U256,
    withdrawal: &Withdrawal,
) -> WithdrawalReadiness {
    if !session.is_connected() {
        return WithdrawalReadiness::NotConnected;
    }
    if !session.on_expected_chain(expected_chain_id) {
        return WithdrawalReadiness::WrongNetwork;
    }
    if !pool_has_liquidity || user_liquidity.is_zero() {
        return WithdrawalReadiness::NoPosition;
    }
    if withdrawal.liquidity_to_burn.is_zero() {
        return WithdrawalReadiness::NothingToBurn;
    }
    WithdrawalReadiness::Ready
}

/// Which token of a deposit a readiness check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositSide {
    A,
    B,
}

/// Wallet holdings of one token, as far as the DEX is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenFunds {
    #[serde(with = "u256_decimal")]
    pub balance: U256,
    /// Allowance granted to the DEX contract.
    #[serde(with = "u256_decimal")]
    pub allowance: U256,
}

impl TokenFunds {
    pub fn new(balance: U256, allowance: U256) -> Self {
        Self { balance, allowance }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositReadiness {
    NotConnected,
    WrongNetwork,
    EnterAmount,
    InsufficientBalance(DepositSide),
    NeedsApproval(DepositSide),
    Ready,
}

impl DepositReadiness {
    pub fn label(&self) -> &'static str {
        match self {
            DepositReadiness::NotConnected => "Connect wallet",
            DepositReadiness::WrongNetwork => "Switch network",
            DepositReadiness::EnterAmount => "Enter amounts",
            DepositReadiness::InsufficientBalance(DepositSide::A) => "Insufficient token A balance",
            DepositReadiness::InsufficientBalance(DepositSide::B) => "Insufficient token B balance",
            DepositReadiness::NeedsApproval(DepositSide::A) => "Approve token A",
            DepositReadiness::NeedsApproval(DepositSide::B) => "Approve token B",
            DepositReadiness::Ready => "Add liquidity",
        }
    }
}

/// Gate the add-liquidity action.
///
/// Both amounts must be set. Balances are checked for both tokens before
/// any allowance, token A first.
pub fn deposit_readiness(
    session: &WalletSession,
    expected_chain_id: u64,
    amount_a: U256,
    amount_b: Option<U256>,
    funds_a: &TokenFunds,
    funds_b: &TokenFunds,
) -> DepositReadiness {
    if !session.is_connected() {
        return DepositReadiness::NotConnected;
    }
    if !session.on_expected_chain(expected_chain_id) {
        return DepositReadiness::WrongNetwork;
    }
    let amount_b = match amount_b {
        Some(amount_b) if !amount_a.is_zero() && !amount_b.is_zero() => amount_b,
        _ => return DepositReadiness::EnterAmount,
    };
    if amount_a > funds_a.balance {
        return DepositReadiness::InsufficientBalance(DepositSide::A);
    }
    if amount_b > funds_b.balance {
        return DepositReadiness::InsufficientBalance(DepositSide::B);
    }
    if amount_a > funds_a.allowance {
        return DepositReadiness::NeedsApproval(DepositSide::A);
    }
    if amount_b > funds_b.allowance {
        return DepositReadiness::NeedsApproval(DepositSide::B);
    }
    DepositReadiness::Ready
}
