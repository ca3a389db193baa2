use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::amm::{ReservePair, TokenPair};
use crate::domain::history::TradeHistory;
use crate::shared::errors::DexError;

/// Read access to the DEX contract and the ERC20 tokens it trades.
///
/// Every answer is a point-in-time view; the chain may move on before the
/// caller acts on it.
#[async_trait]
pub trait DexReader: Send + Sync {
    /// Address of the DEX contract, the spender of swap and deposit allowances.
    fn dex_address(&self) -> Address;

    /// Reserves of the pool, zero on both sides if it was never funded.
    async fn pool_reserves(&self, pair: TokenPair) -> Result<ReservePair, DexError>;

    /// Liquidity units issued for the pool.
    async fn total_liquidity(&self, pair: TokenPair) -> Result<U256, DexError>;

    /// Liquidity units held by `owner`.
    async fn user_liquidity(&self, pair: TokenPair, owner: Address) -> Result<U256, DexError>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, DexError>;

    /// Allowance `owner` granted to the DEX contract.
    async fn allowance(&self, token: Address, owner: Address) -> Result<U256, DexError>;

    /// Swap output as the contract's `getAmountOut` computes it.
    async fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, DexError>;

    /// The most recent `limit` trades of `trader` and the total on record.
    async fn trade_history(&self, trader: Address, limit: u64) -> Result<TradeHistory, DexError>;
}
