//! Swaps recorded by the DEX contract

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::shared::units::u256_decimal;

/// Trades fetched per history request.
pub const TRADE_HISTORY_LIMIT: u64 = 10;

/// One swap as the contract logged it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "u256_decimal")]
    pub amount_in: U256,
    #[serde(with = "u256_decimal")]
    pub amount_out: U256,
    /// Block timestamp in Unix seconds.
    pub timestamp: u64,
}

/// A page of an account's trades next to the total the contract holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeHistory {
    pub total: u64,
    pub trades: Vec<TradeRecord>,
}

impl TradeHistory {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
