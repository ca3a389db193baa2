//! AMM client accounting - reserve resolution, swap quotes and liquidity
//! withdrawal estimates.
//!
//! Everything here is synchronous and works on a snapshot the caller already
//! fetched. Results are estimates; the DEX contract recomputes the
//! authoritative amounts when the transaction executes.

mod liquidity;
mod pair;
mod reserves;
mod swap;

pub use liquidity::{
    calculate_withdrawal, deposit_readiness, paired_deposit_amount, withdrawal_readiness,
    DepositReadiness, DepositSide, TokenFunds, UserLiquidityShare, Withdrawal, WithdrawalPercentage,
    WithdrawalReadiness, MAX_EFFECTIVE_PERCENTAGE,
};
pub use pair::TokenPair;
pub use reserves::{resolve_reserves, ReservePair, ReserveSnapshot, ReserveSource, ResolvedReserves};
pub use swap::{
    exchange_rate, quote_swap, quote_swap_with_fee, swap_output, swap_readiness, QuoteOutcome,
    SwapFee, SwapQuote, SwapReadiness, DEX_FEE,
};

use alloy_primitives::U256;

/// 1e18, fixed-point scale for proportions and rates.
pub const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Basis points in one whole.
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);
