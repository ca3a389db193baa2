//! Keep the most recent pool snapshot and quote against it on every input change

use alloy_primitives::U256;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::services::{ExchangeService, PoolView};
use crate::domain::amm::{
    quote_swap_with_fee, resolve_reserves, QuoteOutcome, ResolvedReserves, SwapFee, TokenPair, DEX_FEE,
};
use crate::shared::errors::{AccountingError, AppError};
use crate::shared::types::TokenAsset;

/// Handed out when a refresh starts; only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Latest-wins slot for data fetched in the background.
///
/// A fetch that finishes after a newer one was started is dropped, so a slow
/// response never overwrites fresher state.
#[derive(Debug)]
pub struct LatestSnapshot<T> {
    generation: AtomicU64,
    slot: RwLock<Option<(u64, T)>>,
}

impl<T: Clone> LatestSnapshot<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: RwLock::new(None),
        }
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `value` if `ticket` is still the newest. Returns whether it was kept.
    pub async fn complete(&self, ticket: RefreshTicket, value: T) -> bool {
        // Checked under the lock: `reset` bumps the generation before it
        // waits for the slot.
        let mut slot = self.slot.write().await;
        if ticket.0 != self.generation.load(Ordering::SeqCst) {
            debug!(ticket = ticket.0, "dropping superseded snapshot");
            return false;
        }
        if matches!(*slot, Some((stored, _)) if stored > ticket.0) {
            return false;
        }
        *slot = Some((ticket.0, value));
        true
    }

    pub async fn current(&self) -> Option<T> {
        self.slot.read().await.as_ref().map(|(_, value)| value.clone())
    }

    /// Forget the stored value and invalidate every in-flight refresh.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.slot.write().await = None;
    }
}

impl<T: Clone> Default for LatestSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap form state: a token direction plus the latest pool snapshot.
///
/// Refreshing is async; quoting is synchronous over whatever snapshot is
/// current, so it can run on every keystroke.
pub struct LiveSwapQuote {
    token_in: TokenAsset,
    token_out: TokenAsset,
    pair: TokenPair,
    fee: SwapFee,
    pool: LatestSnapshot<PoolView>,
}

impl LiveSwapQuote {
    pub fn new(token_in: TokenAsset, token_out: TokenAsset) -> Result<Self, AppError> {
        let pair = TokenPair::new(token_in.address, token_out.address).ok_or_else(|| {
            AppError::InvalidInput(format!("Cannot swap {} for itself", token_in.symbol))
        })?;
        Ok(Self {
            token_in,
            token_out,
            pair,
            fee: DEX_FEE,
            pool: LatestSnapshot::new(),
        })
    }

    pub fn with_fee(mut self, fee: SwapFee) -> Self {
        self.fee = fee;
        self
    }

    pub fn token_in(&self) -> &TokenAsset {
        &self.token_in
    }

    pub fn token_out(&self) -> &TokenAsset {
        &self.token_out
    }

    /// Fetch the pool; returns `false` if a newer refresh overtook this one.
    pub async fn refresh(&self, service: &ExchangeService) -> Result<bool, AppError> {
        let ticket = self.pool.begin_refresh();
        let view = service.fetch_pool(self.pair, None).await?;
        Ok(self.pool.complete(ticket, view).await)
    }

    /// Swap direction; the cached pool stays valid since the pair is unchanged.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.token_in, &mut self.token_out);
    }

    /// Current reserves in swap direction, `None` until a snapshot has been fetched.
    pub async fn reserves(&self) -> Option<ResolvedReserves> {
        let view = self.pool.current().await?;
        Some(resolve_reserves(&view.reserves, self.token_in.address, self.token_out.address))
    }

    /// `None` until a snapshot has been fetched.
    pub async fn quote(&self, amount_in: U256) -> Result<Option<QuoteOutcome>, AccountingError> {
        let Some(reserves) = self.reserves().await else {
            return Ok(None);
        };
        quote_swap_with_fee(amount_in, reserves.reserve_of_a, reserves.reserve_of_b, self.fee).map(Some)
    }
}
