//! DEX reads through the contract bindings over an HTTP provider

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::contracts::{Erc20Instance, SimpleDex, SimpleDexInstance, IERC20};
use super::dex_reader::DexReader;
use crate::domain::amm::{ReservePair, TokenPair};
use crate::domain::history::{TradeHistory, TradeRecord};
use crate::shared::errors::DexError;

/// Reads DEX and token state from a node at `latest`.
pub struct RpcDexReader {
    provider: DynProvider,
    dex: SimpleDexInstance,
}

fn call_failed(call: &'static str) -> impl Fn(alloy::contract::Error) -> DexError {
    move |err| {
        warn!(call, %err, "contract call failed");
        DexError::from(err)
    }
}

impl RpcDexReader {
    pub fn new(rpc_url: &str, dex: Address) -> Result<Self, DexError> {
        let url: Url = rpc_url.parse().map_err(|e| DexError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: format!("{}", e),
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self {
            dex: SimpleDex::new(dex, provider.clone()),
            provider,
        })
    }

    fn token(&self, token: Address) -> Erc20Instance {
        IERC20::new(token, self.provider.clone())
    }
}

#[async_trait]
impl DexReader for RpcDexReader {
    fn dex_address(&self) -> Address {
        *self.dex.address()
    }

    async fn pool_reserves(&self, pair: TokenPair) -> Result<ReservePair, DexError> {
        let (first, second) = pair.get();
        debug!(%pair, "liquidityPools");
        let reserves = self
            .dex
            .liquidityPools(first, second)
            .call()
            .await
            .map_err(call_failed("liquidityPools"))?;
        Ok(ReservePair::from_canonical(
            pair,
            reserves.tokenAReserve,
            reserves.tokenBReserve,
        ))
    }

    async fn total_liquidity(&self, pair: TokenPair) -> Result<U256, DexError> {
        let (first, second) = pair.get();
        self.dex
            .liquidity(first, second)
            .call()
            .await
            .map_err(call_failed("liquidity"))
    }

    async fn user_liquidity(&self, pair: TokenPair, owner: Address) -> Result<U256, DexError> {
        let (first, second) = pair.get();
        self.dex
            .getUserLiquidity(first, second, owner)
            .call()
            .await
            .map_err(call_failed("getUserLiquidity"))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
        self.token(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(call_failed("balanceOf"))
    }

    async fn allowance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
        self.token(token)
            .allowance(owner, *self.dex.address())
            .call()
            .await
            .map_err(call_failed("allowance"))
    }

    async fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, DexError> {
        self.dex
            .getAmountOut(amount_in, reserve_in, reserve_out)
            .call()
            .await
            .map_err(call_failed("getAmountOut"))
    }

    async fn trade_history(&self, trader: Address, limit: u64) -> Result<TradeHistory, DexError> {
        let total = self
            .dex
            .getTradeHistoryCount(trader)
            .call()
            .await
            .map_err(call_failed("getTradeHistoryCount"))?;
        if total.is_zero() {
            return Ok(TradeHistory::default());
        }

        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let trades = self
            .dex
            .getTradeHistory(
                trader,
                Address::ZERO,
                Address::ZERO,
                U256::ZERO,
                U256::from(now),
                U256::from(limit),
                U256::ZERO,
            )
            .call()
            .await
            .map_err(call_failed("getTradeHistory"))?;
        debug!(%trader, %total, fetched = trades.len(), "trade history");

        Ok(TradeHistory {
            total: u64::try_from(total).unwrap_or(u64::MAX),
            trades: trades
                .into_iter()
                .map(|trade| TradeRecord {
                    trader: trade.trader,
                    token_in: trade.tokenIn,
                    token_out: trade.tokenOut,
                    amount_in: trade.amountIn,
                    amount_out: trade.amountOut,
                    timestamp: u64::try_from(trade.timestamp).unwrap_or(u64::MAX),
                })
                .collect(),
        })
    }
}
