//! Application services - fetch pool state, then run the AMM accounting on it

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::amm::{
    calculate_withdrawal, deposit_readiness, exchange_rate, paired_deposit_amount,
    quote_swap_with_fee, resolve_reserves, swap_readiness, withdrawal_readiness, DepositReadiness,
    QuoteOutcome, ReservePair, ResolvedReserves, SwapFee, SwapQuote, SwapReadiness, TokenFunds,
    TokenPair, UserLiquidityShare, Withdrawal, WithdrawalPercentage, WithdrawalReadiness, DEX_FEE,
};
use crate::domain::history::{TradeRecord, TRADE_HISTORY_LIMIT};
use crate::domain::registry::TokenRegistry;
use crate::domain::session::WalletSession;
use crate::infrastructure::DexReader;
use crate::shared::errors::AppError;
use crate::shared::types::{NetworkInfo, TokenAsset};

/// Pool state read in one go.
#[derive(Debug, Clone)]
pub struct PoolView {
    pub reserves: ReservePair,
    pub total_liquidity: U256,
    /// Liquidity of the session owner, `None` without a connected wallet.
    pub user_liquidity: Option<U256>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SwapPreview {
    pub token_in: TokenAsset,
    pub token_out: TokenAsset,
    pub reserves: ResolvedReserves,
    pub outcome: QuoteOutcome,
    /// What the contract's `getAmountOut` returns for the same swap.
    pub contract_amount_out: Option<U256>,
    /// Output per input token, scaled by 1e18.
    pub exchange_rate: Option<U256>,
    pub balance: Option<U256>,
    pub allowance: Option<U256>,
    pub readiness: SwapReadiness,
}

impl SwapPreview {
    /// The contract's figure when it was asked, the local estimate otherwise.
    pub fn amount_out(&self) -> Option<U256> {
        self.contract_amount_out
            .or_else(|| self.outcome.quote().map(|quote| quote.amount_out))
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalPreview {
    pub token_a: TokenAsset,
    pub token_b: TokenAsset,
    pub percentage: WithdrawalPercentage,
    pub reserves: ResolvedReserves,
    pub total_liquidity: U256,
    pub user_liquidity: U256,
    pub withdrawal: Withdrawal,
    pub readiness: WithdrawalReadiness,
}

#[derive(Debug, Clone)]
pub struct DepositPreview {
    pub token_a: TokenAsset,
    pub token_b: TokenAsset,
    pub amount_a: U256,
    /// Set from the pool ratio, or by the depositor for an empty pool.
    pub amount_b: Option<U256>,
    /// `None` when the pool is empty and the depositor picks the ratio.
    pub pool_ratio: Option<U256>,
    pub funds_a: Option<TokenFunds>,
    pub funds_b: Option<TokenFunds>,
    pub readiness: DepositReadiness,
}

/// A logged trade with its tokens resolved against the registry.
#[derive(Debug, Clone)]
pub struct TradeListing {
    pub record: TradeRecord,
    pub token_in: TokenAsset,
    pub token_out: TokenAsset,
}

#[derive(Debug, Clone)]
pub struct PoolListing {
    pub token_a: TokenAsset,
    pub token_b: TokenAsset,
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub user_liquidity: Option<U256>,
}

/// Exchange use cases over a [`DexReader`].
pub struct ExchangeService {
    reader: Arc<dyn DexReader>,
    registry: TokenRegistry,
    network: NetworkInfo,
    fee: SwapFee,
}

impl ExchangeService {
    pub fn new(reader: Arc<dyn DexReader>, registry: TokenRegistry, network: NetworkInfo) -> Self {
        Self {
            reader,
            registry,
            network,
            fee: DEX_FEE,
        }
    }

    /// Quote locally with `fee` instead of the devnet fee.
    pub fn with_fee(mut self, fee: SwapFee) -> Self {
        self.fee = fee;
        self
    }

    pub fn fee(&self) -> SwapFee {
        self.fee
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    fn pair(token_a: &TokenAsset, token_b: &TokenAsset) -> Result<TokenPair, AppError> {
        TokenPair::new(token_a.address, token_b.address).ok_or_else(|| {
            AppError::InvalidInput(format!("Cannot pair {} with itself", token_a.symbol))
        })
    }

    /// Read reserves, total liquidity and the owner's position concurrently.
    pub async fn fetch_pool(&self, pair: TokenPair, owner: Option<Address>) -> Result<PoolView, AppError> {
        debug!(%pair, "fetching pool state");
        let user_liquidity = async {
            match owner {
                Some(owner) => self.reader.user_liquidity(pair, owner).await.map(Some),
                None => Ok(None),
            }
        };

        let (reserves, total_liquidity, user_liquidity) = futures::try_join!(
            self.reader.pool_reserves(pair),
            self.reader.total_liquidity(pair),
            user_liquidity,
        )?;

        Ok(PoolView {
            reserves,
            total_liquidity,
            user_liquidity,
            fetched_at: Utc::now(),
        })
    }

    /// Balance and allowance of `token`, `None` without an owner.
    pub async fn funds(&self, token: &TokenAsset, owner: Option<Address>) -> Result<Option<TokenFunds>, AppError> {
        let Some(owner) = owner else {
            return Ok(None);
        };
        let (balance, allowance) = futures::try_join!(
            self.reader.token_balance(token.address, owner),
            self.reader.allowance(token.address, owner),
        )?;
        Ok(Some(TokenFunds::new(balance, allowance)))
    }

    /// Ask the contract for the output of a locally quoted swap.
    ///
    /// A mismatch means the configured fee does not match the deployment; it
    /// is logged and the contract's figure is returned.
    pub async fn confirm_amount_out(&self, quote: &SwapQuote, reserves: &ResolvedReserves) -> Result<U256, AppError> {
        let onchain = self
            .reader
            .amount_out(quote.amount_in, reserves.reserve_of_a, reserves.reserve_of_b)
            .await?;
        if onchain != quote.amount_out {
            warn!(
                "⚠️  Local quote {} differs from getAmountOut {} (fee {}/{}), check [dex] fee",
                quote.amount_out, onchain, self.fee.numerator, self.fee.denominator
            );
        }
        Ok(onchain)
    }

    /// The owner's position in the `(token_a, token_b)` pool.
    pub async fn position(
        &self,
        token_a: &TokenAsset,
        token_b: &TokenAsset,
        owner: Address,
    ) -> Result<UserLiquidityShare, AppError> {
        let pair = Self::pair(token_a, token_b)?;
        let liquidity = self.reader.user_liquidity(pair, owner).await?;
        Ok(UserLiquidityShare {
            owner,
            pair,
            liquidity,
        })
    }

    /// Quote swapping `amount_in` of `token_in` for `token_out`.
    pub async fn preview_swap(
        &self,
        session: &WalletSession,
        token_in: &TokenAsset,
        token_out: &TokenAsset,
        amount_in: U256,
    ) -> Result<SwapPreview, AppError> {
        let pair = Self::pair(token_in, token_out)?;
        let pool = self.fetch_pool(pair, None).await?;

        let reserves = resolve_reserves(&pool.reserves, token_in.address, token_out.address);
        let outcome = quote_swap_with_fee(amount_in, reserves.reserve_of_a, reserves.reserve_of_b, self.fee)?;
        let exchange_rate = exchange_rate(reserves.reserve_of_a, reserves.reserve_of_b)?;

        let contract_amount_out = async {
            match outcome.quote() {
                Some(quote) => self.confirm_amount_out(quote, &reserves).await.map(Some),
                None => Ok(None),
            }
        };
        let (contract_amount_out, funds) =
            futures::try_join!(contract_amount_out, self.funds(token_in, session.account()))?;

        let funds_in = funds.unwrap_or_default();
        let readiness = swap_readiness(
            session,
            self.network.chain_id,
            &outcome,
            amount_in,
            funds_in.balance,
            funds_in.allowance,
        );

        match outcome {
            QuoteOutcome::Quoted(ref quote) => info!(
                "💱 {} {} -> {} {} (impact {} bps)",
                quote.amount_in, token_in.symbol, quote.amount_out, token_out.symbol, quote.price_impact_bps
            ),
            QuoteOutcome::NoLiquidity => warn!(
                "⚠️  No liquidity in {}-{} pool",
                token_in.symbol, token_out.symbol
            ),
        }

        Ok(SwapPreview {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            reserves,
            outcome,
            contract_amount_out,
            exchange_rate,
            balance: funds.map(|funds| funds.balance),
            allowance: funds.map(|funds| funds.allowance),
            readiness,
        })
    }

    /// Estimate removing `percentage` of the session owner's position.
    pub async fn preview_withdrawal(
        &self,
        session: &WalletSession,
        token_a: &TokenAsset,
        token_b: &TokenAsset,
        percentage: WithdrawalPercentage,
    ) -> Result<WithdrawalPreview, AppError> {
        let pair = Self::pair(token_a, token_b)?;
        let pool = self.fetch_pool(pair, session.account()).await?;

        let reserves = resolve_reserves(&pool.reserves, token_a.address, token_b.address);
        let user_liquidity = pool.user_liquidity.unwrap_or_default();
        let withdrawal = calculate_withdrawal(
            user_liquidity,
            pool.total_liquidity,
            reserves.reserve_of_a,
            reserves.reserve_of_b,
            percentage,
        )?;
        let readiness = withdrawal_readiness(
            session,
            self.network.chain_id,
            reserves.has_liquidity(),
            user_liquidity,
            &withdrawal,
        );

        info!(
            "💧 Withdraw {}% of {}-{}: burn {} for {} / {}",
            percentage.effective(),
            token_a.symbol,
            token_b.symbol,
            withdrawal.liquidity_to_burn,
            withdrawal.amount_a,
            withdrawal.amount_b
        );

        Ok(WithdrawalPreview {
            token_a: token_a.clone(),
            token_b: token_b.clone(),
            percentage,
            reserves,
            total_liquidity: pool.total_liquidity,
            user_liquidity,
            withdrawal,
            readiness,
        })
    }

    /// Amount of `token_b` matching `amount_a` at the current pool ratio, and
    /// whether the session owner can fund both sides.
    ///
    /// `amount_b` is only used for an empty pool, where the depositor sets
    /// the ratio.
    pub async fn preview_deposit(
        &self,
        session: &WalletSession,
        token_a: &TokenAsset,
        token_b: &TokenAsset,
        amount_a: U256,
        amount_b: Option<U256>,
    ) -> Result<DepositPreview, AppError> {
        let pair = Self::pair(token_a, token_b)?;
        let owner = session.account();
        let (reserves, funds_a, funds_b) = futures::try_join!(
            async { Ok::<_, AppError>(self.reader.pool_reserves(pair).await?) },
            self.funds(token_a, owner),
            self.funds(token_b, owner),
        )?;
        let resolved = resolve_reserves(&reserves, token_a.address, token_b.address);

        let paired = paired_deposit_amount(amount_a, resolved.reserve_of_a, resolved.reserve_of_b)?;
        let amount_b = paired.or(amount_b);
        let readiness = deposit_readiness(
            session,
            self.network.chain_id,
            amount_a,
            amount_b,
            &funds_a.unwrap_or_default(),
            &funds_b.unwrap_or_default(),
        );
        debug!(%amount_a, ?amount_b, ?readiness, "deposit previewed");

        Ok(DepositPreview {
            token_a: token_a.clone(),
            token_b: token_b.clone(),
            amount_a,
            amount_b,
            pool_ratio: exchange_rate(resolved.reserve_of_a, resolved.reserve_of_b)?,
            funds_a,
            funds_b,
            readiness,
        })
    }

    /// The most recent trades of `trader`, tokens named through the registry.
    ///
    /// Tokens missing from the registry show as "Unknown" with 18 decimals.
    pub async fn trade_history(&self, trader: Address) -> Result<(u64, Vec<TradeListing>), AppError> {
        let history = self.reader.trade_history(trader, TRADE_HISTORY_LIMIT).await?;
        let resolve = |address: Address| {
            self.registry
                .get(&address)
                .cloned()
                .unwrap_or_else(|| TokenAsset::new(address, "Unknown", "Unknown", 18))
        };

        let trades: Vec<TradeListing> = history
            .trades
            .into_iter()
            .map(|record| TradeListing {
                token_in: resolve(record.token_in),
                token_out: resolve(record.token_out),
                record,
            })
            .collect();
        info!("📜 {} of {} trades for {}", trades.len(), history.total, trader);
        Ok((history.total, trades))
    }

    /// Every funded pool among the registered tokens.
    ///
    /// A pool that fails to load is logged and left out.
    pub async fn list_pools(&self, owner: Option<Address>) -> Vec<PoolListing> {
        let pairs = self.registry.pairs();
        let fetches = pairs.iter().map(|(a, b)| async move {
            let pair = Self::pair(a, b)?;
            let view = self.fetch_pool(pair, owner).await?;
            Ok::<_, AppError>((*a, *b, view))
        });

        let mut pools = Vec::new();
        for result in join_all(fetches).await {
            match result {
                Ok((a, b, view)) => {
                    if view.reserves.is_empty() {
                        debug!("Pool {}-{} doesn't exist, skipping", a.symbol, b.symbol);
                        continue;
                    }
                    let resolved = resolve_reserves(&view.reserves, a.address, b.address);
                    pools.push(PoolListing {
                        token_a: a.clone(),
                        token_b: b.clone(),
                        reserve_a: resolved.reserve_of_a,
                        reserve_b: resolved.reserve_of_b,
                        user_liquidity: view.user_liquidity,
                    });
                }
                Err(e) => warn!("❌ Failed to load pool: {}", e),
            }
        }

        info!("📊 Found {} funded pools", pools.len());
        pools
    }
}
