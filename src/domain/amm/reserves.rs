//! Reserve lookup with canonical token ordering

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use super::pair::TokenPair;
use crate::shared::units::u256_decimal;

/// Point-in-time reserves of one pool, stored in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    pub pair: TokenPair,
    #[serde(with = "u256_decimal")]
    pub reserve_first: U256,
    #[serde(with = "u256_decimal")]
    pub reserve_second: U256,
}

impl ReservePair {
    /// Build from reserves given in the caller's `(token_a, token_b)` order.
    pub fn new(token_a: Address, token_b: Address, reserve_a: U256, reserve_b: U256) -> Option<Self> {
        let pair = TokenPair::new(token_a, token_b)?;
        let (reserve_first, reserve_second) = if pair.first() == token_a {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        Some(Self {
            pair,
            reserve_first,
            reserve_second,
        })
    }

    /// Reserves as the contract returns them for the canonical pair.
    pub fn from_canonical(pair: TokenPair, reserve_first: U256, reserve_second: U256) -> Self {
        Self {
            pair,
            reserve_first,
            reserve_second,
        }
    }

    pub fn reserve_of(&self, token: &Address) -> Option<U256> {
        if *token == self.pair.first() {
            Some(self.reserve_first)
        } else if *token == self.pair.second() {
            Some(self.reserve_second)
        } else {
            None
        }
    }

    /// A 0/0 pool has never been funded.
    pub fn is_empty(&self) -> bool {
        self.reserve_first.is_zero() && self.reserve_second.is_zero()
    }

    pub fn has_liquidity(&self) -> bool {
        !self.reserve_first.is_zero() && !self.reserve_second.is_zero()
    }
}

/// Anything that can answer "what are the reserves of this canonical pair".
pub trait ReserveSource {
    /// Reserves in canonical order, `None` if the pool is unknown.
    fn reserves(&self, pair: &TokenPair) -> Option<(U256, U256)>;
}

impl ReserveSource for ReservePair {
    fn reserves(&self, pair: &TokenPair) -> Option<(U256, U256)> {
        (self.pair == *pair).then_some((self.reserve_first, self.reserve_second))
    }
}

/// Reserves of several pools fetched together.
#[derive(Debug, Clone, Default)]
pub struct ReserveSnapshot {
    pools: HashMap<TokenPair, ReservePair>,
}

impl ReserveSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reserves: ReservePair) {
        self.pools.insert(reserves.pair, reserves);
    }

    pub fn get(&self, pair: &TokenPair) -> Option<&ReservePair> {
        self.pools.get(pair)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl FromIterator<ReservePair> for ReserveSnapshot {
    fn from_iter<I: IntoIterator<Item = ReservePair>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for reserves in iter {
            snapshot.insert(reserves);
        }
        snapshot
    }
}

impl ReserveSource for ReserveSnapshot {
    fn reserves(&self, pair: &TokenPair) -> Option<(U256, U256)> {
        self.pools
            .get(pair)
            .map(|pool| (pool.reserve_first, pool.reserve_second))
    }
}

/// Reserves re-mapped to the order the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReserves {
    #[serde(with = "u256_decimal")]
    pub reserve_of_a: U256,
    #[serde(with = "u256_decimal")]
    pub reserve_of_b: U256,
    pub canonical_order_matches_input: bool,
}

impl ResolvedReserves {
    /// Both sides funded. A zero on either side means no usable price.
    pub fn has_liquidity(&self) -> bool {
        !self.reserve_of_a.is_zero() && !self.reserve_of_b.is_zero()
    }
}

/// Look up the pool of `(asset_a, asset_b)` in any order and return its
/// reserves in that same order.
///
/// Unknown pools and identical assets resolve to zero reserves.
pub fn resolve_reserves<S>(source: &S, asset_a: Address, asset_b: Address) -> ResolvedReserves
where
    S: ReserveSource + ?Sized,
{
    let Some(pair) = TokenPair::new(asset_a, asset_b) else {
        return ResolvedReserves {
            reserve_of_a: U256::ZERO,
            reserve_of_b: U256::ZERO,
            canonical_order_matches_input: true,
        };
    };

    let canonical_order_matches_input = pair.first() == asset_a;
    let (first, second) = source.reserves(&pair).unwrap_or((U256::ZERO, U256::ZERO));
    trace!(%pair, %first, %second, "resolved pool reserves");

    let (reserve_of_a, reserve_of_b) = if canonical_order_matches_input {
        (first, second)
    } else {
        (second, first)
    };

    ResolvedReserves {
        reserve_of_a,
        reserve_of_b,
        canonical_order_matches_input,
    }
}
