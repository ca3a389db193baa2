// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{
    DepositPreview, PoolListing, SwapPreview, TradeListing, WithdrawalPreview,
};
use crate::domain::amm::QuoteOutcome;
use crate::shared::units::{format_bps, format_units, LIQUIDITY_DECIMALS};

/// Rates are scaled by 1e18 whatever the token decimals.
const RATE_DECIMALS: u8 = 18;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenDetails {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SwapReport {
    pub token_in: TokenDetails,
    pub token_out: TokenDetails,
    pub amount_in: String,
    /// Absent when the pool has no liquidity.
    pub amount_out: Option<String>,
    pub price_impact_percent: Option<String>,
    pub exchange_rate: Option<String>,
    pub no_liquidity: bool,
    pub readiness: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawalReport {
    pub token_a: TokenDetails,
    pub token_b: TokenDetails,
    pub percentage: u8,
    pub effective_percentage: u8,
    pub user_liquidity: String,
    pub liquidity_to_burn: String,
    pub amount_a: String,
    pub amount_b: String,
    pub readiness: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepositReport {
    pub token_a: TokenDetails,
    pub token_b: TokenDetails,
    pub amount_a: String,
    /// Absent for an empty pool until the depositor sets the ratio.
    pub amount_b: Option<String>,
    pub pool_ratio: Option<String>,
    pub balance_a: Option<String>,
    pub balance_b: Option<String>,
    pub allowance_a: Option<String>,
    pub allowance_b: Option<String>,
    pub readiness: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TradeReport {
    pub token_in: TokenDetails,
    pub token_out: TokenDetails,
    pub amount_in: String,
    pub amount_out: String,
    pub executed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TradeHistoryReport {
    pub trader: String,
    pub total: u64,
    pub trades: Vec<TradeReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PoolReport {
    pub token_a: TokenDetails,
    pub token_b: TokenDetails,
    pub reserve_a: String,
    pub reserve_b: String,
    pub user_liquidity: Option<String>,
}

fn details(token: &crate::shared::types::TokenAsset) -> TokenDetails {
    TokenDetails {
        address: token.address.to_string(),
        symbol: token.symbol.clone(),
        decimals: token.decimals,
    }
}

impl SwapReport {
    pub fn from_preview(preview: &SwapPreview, amount_in: alloy_primitives::U256) -> Self {
        let quote = preview.outcome.quote();
        Self {
            token_in: details(&preview.token_in),
            token_out: details(&preview.token_out),
            amount_in: format_units(amount_in, preview.token_in.decimals),
            amount_out: quote
                .and(preview.amount_out())
                .map(|amount| format_units(amount, preview.token_out.decimals)),
            price_impact_percent: quote.map(|q| format_bps(q.price_impact_bps)),
            exchange_rate: preview
                .exchange_rate
                .map(|rate| format_units(rate, RATE_DECIMALS)),
            no_liquidity: matches!(preview.outcome, QuoteOutcome::NoLiquidity),
            readiness: preview.readiness.label().to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl WithdrawalReport {
    pub fn from_preview(preview: &WithdrawalPreview) -> Self {
        Self {
            token_a: details(&preview.token_a),
            token_b: details(&preview.token_b),
            percentage: preview.percentage.get(),
            effective_percentage: preview.percentage.effective(),
            user_liquidity: format_units(preview.user_liquidity, LIQUIDITY_DECIMALS),
            liquidity_to_burn: format_units(preview.withdrawal.liquidity_to_burn, LIQUIDITY_DECIMALS),
            amount_a: format_units(preview.withdrawal.amount_a, preview.token_a.decimals),
            amount_b: format_units(preview.withdrawal.amount_b, preview.token_b.decimals),
            readiness: format!("{:?}", preview.readiness),
            timestamp: Utc::now(),
        }
    }
}

impl DepositReport {
    pub fn from_preview(preview: &DepositPreview) -> Self {
        Self {
            token_a: details(&preview.token_a),
            token_b: details(&preview.token_b),
            amount_a: format_units(preview.amount_a, preview.token_a.decimals),
            amount_b: preview
                .amount_b
                .map(|amount| format_units(amount, preview.token_b.decimals)),
            pool_ratio: preview.pool_ratio.map(|ratio| format_units(ratio, RATE_DECIMALS)),
            balance_a: preview.funds_a.map(|f| format_units(f.balance, preview.token_a.decimals)),
            balance_b: preview.funds_b.map(|f| format_units(f.balance, preview.token_b.decimals)),
            allowance_a: preview.funds_a.map(|f| format_units(f.allowance, preview.token_a.decimals)),
            allowance_b: preview.funds_b.map(|f| format_units(f.allowance, preview.token_b.decimals)),
            readiness: preview.readiness.label().to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl From<&TradeListing> for TradeReport {
    fn from(trade: &TradeListing) -> Self {
        let executed_at = i64::try_from(trade.record.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        Self {
            token_in: details(&trade.token_in),
            token_out: details(&trade.token_out),
            amount_in: format_units(trade.record.amount_in, trade.token_in.decimals),
            amount_out: format_units(trade.record.amount_out, trade.token_out.decimals),
            executed_at,
        }
    }
}

impl From<&PoolListing> for PoolReport {
    fn from(pool: &PoolListing) -> Self {
        Self {
            token_a: details(&pool.token_a),
            token_b: details(&pool.token_b),
            reserve_a: format_units(pool.reserve_a, pool.token_a.decimals),
            reserve_b: format_units(pool.reserve_b, pool.token_b.decimals),
            user_liquidity: pool
                .user_liquidity
                .map(|liquidity| format_units(liquidity, LIQUIDITY_DECIMALS)),
        }
    }
}

pub fn to_json<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amm::{
        quote_swap, ResolvedReserves, SwapReadiness, Withdrawal, WithdrawalPercentage,
        WithdrawalReadiness, SCALE,
    };
    use crate::domain::registry::TokenRegistry;
    use alloy_primitives::U256;

    fn resolved(a: u64, b: u64) -> ResolvedReserves {
        ResolvedReserves {
            reserve_of_a: U256::from(a),
            reserve_of_b: U256::from(b),
            canonical_order_matches_input: true,
        }
    }

    #[test]
    fn test_swap_report() {
        let registry = TokenRegistry::seismic_devnet();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let usdc = registry.by_symbol("USDC").unwrap().clone();
        let amount_in = U256::from(1_000_000u64);
        let outcome = quote_swap(amount_in, U256::from(100_000_000u64), U256::from(50_000_000u64)).unwrap();

        let preview = SwapPreview {
            token_in: usdt,
            token_out: usdc,
            reserves: resolved(100_000_000, 50_000_000),
            outcome,
            contract_amount_out: None,
            exchange_rate: Some(SCALE / U256::from(2u64)),
            balance: None,
            allowance: None,
            readiness: SwapReadiness::NotConnected,
        };

        let report = SwapReport::from_preview(&preview, amount_in);
        assert_eq!(report.amount_in, "1.0");
        // 997000000 * 50000000 / (100000000 * 1000 + 997000000) = 493579
        assert_eq!(report.amount_out.as_deref(), Some("0.493579"));
        assert_eq!(report.price_impact_percent.as_deref(), Some("0.99"));
        assert_eq!(report.exchange_rate.as_deref(), Some("0.5"));
        assert!(!report.no_liquidity);
        assert_eq!(report.readiness, "Connect wallet");

        let json = to_json(&report).unwrap();
        let parsed: SwapReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.amount_out, report.amount_out);
    }

    #[test]
    fn test_withdrawal_report_uses_liquidity_decimals() {
        let registry = TokenRegistry::seismic_devnet();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let usdc = registry.by_symbol("USDC").unwrap().clone();

        let preview = WithdrawalPreview {
            token_a: usdt,
            token_b: usdc,
            percentage: WithdrawalPercentage::new(100).unwrap(),
            reserves: resolved(4_000_000, 2_000_000),
            total_liquidity: SCALE * U256::from(4u64),
            user_liquidity: SCALE,
            withdrawal: Withdrawal {
                liquidity_to_burn: SCALE * U256::from(99u64) / U256::from(100u64),
                amount_a: U256::from(990_000u64),
                amount_b: U256::from(495_000u64),
            },
            readiness: WithdrawalReadiness::Ready,
        };

        let report = WithdrawalReport::from_preview(&preview);
        assert_eq!(report.percentage, 100);
        assert_eq!(report.effective_percentage, 99);
        assert_eq!(report.user_liquidity, "1.0");
        assert_eq!(report.liquidity_to_burn, "0.99");
        assert_eq!(report.amount_a, "0.99");
        assert_eq!(report.amount_b, "0.495");
        assert_eq!(report.readiness, "Ready");
    }

    #[test]
    fn test_trade_report() {
        use crate::domain::history::TradeRecord;

        let registry = TokenRegistry::seismic_devnet();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let usdc = registry.by_symbol("USDC").unwrap().clone();
        let listing = TradeListing {
            record: TradeRecord {
                trader: alloy_primitives::Address::with_last_byte(0xa1),
                token_in: usdt.address,
                token_out: usdc.address,
                amount_in: U256::from(1_000_000_000u64),
                amount_out: U256::from(493_579_017u64),
                timestamp: 1_741_600_000,
            },
            token_in: usdt,
            token_out: usdc,
        };

        let report = TradeReport::from(&listing);
        assert_eq!(report.amount_in, "1000.0");
        assert_eq!(report.amount_out, "493.579017");
        assert_eq!(report.executed_at.unwrap().timestamp(), 1_741_600_000);
    }
}
