//! DEX reads served from a snapshot file instead of a node

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::Path};
use tracing::info;

use super::dex_reader::DexReader;
use crate::domain::amm::{swap_output, ReservePair, SwapFee, TokenPair, DEX_FEE};
use crate::domain::history::{TradeHistory, TradeRecord};
use crate::shared::errors::{AppError, DexError};
use crate::shared::units::u256_decimal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub dex: Address,
    /// Fee the recorded contract charges; the devnet fee when absent.
    #[serde(default)]
    pub fee: Option<SwapFee>,
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    pub token_a: Address,
    pub token_b: Address,
    #[serde(with = "u256_decimal")]
    pub reserve_a: U256,
    #[serde(with = "u256_decimal")]
    pub reserve_b: U256,
    #[serde(with = "u256_decimal")]
    pub total_liquidity: U256,
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub owner: Address,
    #[serde(with = "u256_decimal")]
    pub liquidity: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub token: Address,
    pub owner: Address,
    #[serde(with = "u256_decimal")]
    pub balance: U256,
    #[serde(with = "u256_decimal")]
    pub allowance: U256,
}

#[derive(Debug, Clone)]
struct PoolState {
    reserves: ReservePair,
    total_liquidity: U256,
    providers: HashMap<Address, U256>,
}

/// In-memory DEX state. Unknown pools and accounts read as zero, the same
/// as unset contract storage.
#[derive(Debug, Clone)]
pub struct StaticDexReader {
    dex: Address,
    fee: SwapFee,
    pools: HashMap<TokenPair, PoolState>,
    accounts: HashMap<(Address, Address), (U256, U256)>,
    trades: Vec<TradeRecord>,
}

impl StaticDexReader {
    pub fn new(dex: Address) -> Self {
        Self {
            dex,
            fee: DEX_FEE,
            pools: HashMap::new(),
            accounts: HashMap::new(),
            trades: Vec::new(),
        }
    }

    /// Answer `amount_out` with another fee than the devnet's.
    pub fn with_fee(mut self, fee: SwapFee) -> Self {
        self.fee = fee;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read snapshot {}: {}", path.display(), e)))?;
        let snapshot: SnapshotFile = serde_json::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse snapshot {}: {}", path.display(), e)))?;

        let reader = Self::from_snapshot(snapshot)?;
        info!("📄 Loaded snapshot with {} pools from {}", reader.pools.len(), path.display());
        Ok(reader)
    }

    pub fn from_snapshot(snapshot: SnapshotFile) -> Result<Self, AppError> {
        let mut reader = Self::new(snapshot.dex);
        if let Some(fee) = snapshot.fee {
            if !fee.is_valid() {
                return Err(AppError::ConfigError(format!(
                    "Invalid snapshot fee {}/{}",
                    fee.numerator, fee.denominator
                )));
            }
            reader.fee = fee;
        }
        for pool in snapshot.pools {
            let pair = reader
                .with_pool(pool.token_a, pool.token_b, pool.reserve_a, pool.reserve_b, pool.total_liquidity)
                .ok_or_else(|| {
                    AppError::ConfigError(format!("Pool with identical tokens: {}", pool.token_a))
                })?;
            for provider in pool.providers {
                reader.set_position(pair, provider.owner, provider.liquidity);
            }
        }
        for account in snapshot.accounts {
            reader.set_account(account.token, account.owner, account.balance, account.allowance);
        }
        for trade in snapshot.trades {
            reader.record_trade(trade);
        }
        Ok(reader)
    }

    /// Register a pool with reserves in `(token_a, token_b)` order.
    pub fn with_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
        total_liquidity: U256,
    ) -> Option<TokenPair> {
        let reserves = ReservePair::new(token_a, token_b, reserve_a, reserve_b)?;
        self.pools.insert(
            reserves.pair,
            PoolState {
                reserves,
                total_liquidity,
                providers: HashMap::new(),
            },
        );
        Some(reserves.pair)
    }

    pub fn set_position(&mut self, pair: TokenPair, owner: Address, liquidity: U256) {
        if let Some(pool) = self.pools.get_mut(&pair) {
            pool.providers.insert(owner, liquidity);
        }
    }

    pub fn set_account(&mut self, token: Address, owner: Address, balance: U256, allowance: U256) {
        self.accounts.insert((token, owner), (balance, allowance));
    }

    /// Append a trade to the log, oldest first.
    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    /// Replace the reserves of a known pool, as a trade on chain would.
    pub fn set_reserves(&mut self, reserves: ReservePair) {
        if let Some(pool) = self.pools.get_mut(&reserves.pair) {
            pool.reserves = reserves;
        }
    }
}

#[async_trait]
impl DexReader for StaticDexReader {
    fn dex_address(&self) -> Address {
        self.dex
    }

    async fn pool_reserves(&self, pair: TokenPair) -> Result<ReservePair, DexError> {
        Ok(self
            .pools
            .get(&pair)
            .map(|pool| pool.reserves)
            .unwrap_or_else(|| ReservePair::from_canonical(pair, U256::ZERO, U256::ZERO)))
    }

    async fn total_liquidity(&self, pair: TokenPair) -> Result<U256, DexError> {
        Ok(self
            .pools
            .get(&pair)
            .map(|pool| pool.total_liquidity)
            .unwrap_or_default())
    }

    async fn user_liquidity(&self, pair: TokenPair, owner: Address) -> Result<U256, DexError> {
        Ok(self
            .pools
            .get(&pair)
            .and_then(|pool| pool.providers.get(&owner).copied())
            .unwrap_or_default())
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
        Ok(self
            .accounts
            .get(&(token, owner))
            .map(|(balance, _)| *balance)
            .unwrap_or_default())
    }

    async fn allowance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
        Ok(self
            .accounts
            .get(&(token, owner))
            .map(|(_, allowance)| *allowance)
            .unwrap_or_default())
    }

    async fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, DexError> {
        swap_output(amount_in, reserve_in, reserve_out, self.fee).map_err(|e| DexError::Contract(e.to_string()))
    }

    async fn trade_history(&self, trader: Address, limit: u64) -> Result<TradeHistory, DexError> {
        let own: Vec<&TradeRecord> = self.trades.iter().filter(|trade| trade.trader == trader).collect();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(TradeHistory {
            total: own.len() as u64,
            trades: own.into_iter().take(limit).cloned().collect(),
        })
    }
}
