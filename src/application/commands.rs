//! CLI commands and handlers
use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::application::live_quote::LiveSwapQuote;
use crate::application::services::ExchangeService;
use crate::config::Config;
use crate::domain::amm::{
    swap_readiness, QuoteOutcome, SwapReadiness, WithdrawalPercentage, WithdrawalReadiness,
};
use crate::domain::session::WalletSession;
use crate::infrastructure::{DexReader, RpcDexReader, StaticDexReader};
use crate::report::{
    self, DepositReport, PoolReport, SwapReport, TradeHistoryReport, TradeReport, WithdrawalReport,
};
use crate::shared::errors::AppError;
use crate::shared::units::{format_bps, format_units, parse_units, LIQUIDITY_DECIMALS};

#[derive(Parser)]
#[command(name = "seismint-amm")]
#[command(version, about = "Pool accounting for the Seismint AMM: swap quotes, withdrawals and deposits")]
pub struct Cli {
    /// Path to a TOML config file (defaults to the Seismic devnet)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read DEX state from a JSON snapshot instead of the RPC node
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// RPC endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Print a JSON report instead of log lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the supported tokens
    Tokens,

    /// List funded pools between supported tokens
    Pools {
        /// Also show this account's liquidity
        #[arg(long, value_parser = parse_address)]
        owner: Option<Address>,
    },

    /// Quote a swap
    Quote {
        /// Symbol of the token sold
        #[arg(long)]
        from: String,

        /// Symbol of the token bought
        #[arg(long)]
        to: String,

        /// Amount sold, in whole tokens (e.g. 1.5)
        #[arg(long)]
        amount: String,

        /// Account whose balance and allowance are checked
        #[arg(long, value_parser = parse_address)]
        owner: Option<Address>,

        /// Re-quote every N seconds until interrupted
        #[arg(long)]
        watch: Option<u64>,
    },

    /// Estimate removing liquidity
    Withdraw {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        /// Share of the position to remove, 1-100
        #[arg(long)]
        percentage: u8,

        /// Liquidity provider
        #[arg(long, value_parser = parse_address)]
        owner: Option<Address>,
    },

    /// Amount of the second token matching a deposit of the first
    Deposit {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        /// Amount of `token_a`, in whole tokens
        #[arg(long)]
        amount: String,

        /// Amount of `token_b` for an empty pool, where it sets the ratio
        #[arg(long)]
        amount_b: Option<String>,

        /// Account whose balances and allowances are checked
        #[arg(long, value_parser = parse_address)]
        owner: Option<Address>,
    },

    /// Recent swaps of an account
    Trades {
        #[arg(long, value_parser = parse_address)]
        owner: Option<Address>,
    },
}

/// One re-quote of `quote --watch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTick {
    pub outcome: QuoteOutcome,
    /// Contract output for a quoted swap.
    pub amount_out: Option<U256>,
    pub readiness: SwapReadiness,
}

fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s.trim()).map_err(|e| format!("invalid address {s}: {e}"))
}

pub struct CommandExecutor {
    service: ExchangeService,
    default_owner: Option<Address>,
    json: bool,
}

impl CommandExecutor {
    pub fn new(config: &Config, reader: Arc<dyn DexReader>, json: bool) -> Result<Self, AppError> {
        let registry = config.registry()?;
        let mut service = ExchangeService::new(reader, registry, config.network.clone());
        if let Some(fee) = config.dex.fee {
            service = service.with_fee(fee);
        }
        Ok(Self {
            service,
            default_owner: config.wallet.account,
            json,
        })
    }

    /// Build the executor for the reader selected on the command line.
    pub fn from_cli(cli: &Cli, mut config: Config) -> Result<Self, AppError> {
        if let Some(rpc_url) = &cli.rpc_url {
            config.network.rpc_url = rpc_url.clone();
        }

        let reader: Arc<dyn DexReader> = match &cli.snapshot {
            Some(path) => Arc::new(StaticDexReader::from_file(path)?),
            None => {
                info!("🌐 Connecting to {} ({})", config.network.name, config.network.rpc_url);
                Arc::new(RpcDexReader::new(&config.network.rpc_url, config.dex.address)?)
            }
        };
        debug!(dex = %reader.dex_address(), "reader ready");
        Self::new(&config, reader, cli.json)
    }

    /// Execute the selected command
    pub async fn execute(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Tokens => self.execute_tokens_command(),
            Commands::Pools { owner } => self.execute_pools_command(owner).await,
            Commands::Quote {
                from,
                to,
                amount,
                owner,
                watch,
            } => match watch {
                Some(seconds) => {
                    self.execute_watch_command(&from, &to, &amount, owner, seconds)
                        .await
                }
                None => self.execute_quote_command(&from, &to, &amount, owner).await,
            },
            Commands::Withdraw {
                token_a,
                token_b,
                percentage,
                owner,
            } => {
                self.execute_withdraw_command(&token_a, &token_b, percentage, owner)
                    .await
            }
            Commands::Deposit {
                token_a,
                token_b,
                amount,
                amount_b,
                owner,
            } => {
                self.execute_deposit_command(&token_a, &token_b, &amount, amount_b.as_deref(), owner)
                    .await
            }
            Commands::Trades { owner } => self.execute_trades_command(owner).await,
        }
    }

    fn session(&self, owner: Option<Address>) -> WalletSession {
        match owner.or(self.default_owner) {
            Some(account) => WalletSession::connect(account, self.service.network().chain_id),
            None => WalletSession::Disconnected,
        }
    }

    fn print_json<T: Serialize>(&self, report: &T) -> Result<(), AppError> {
        let json = report::to_json(report)
            .map_err(|e| AppError::Unknown(format!("Failed to serialize report: {}", e)))?;
        println!("{}", json);
        Ok(())
    }

    fn execute_tokens_command(&self) -> Result<(), AppError> {
        let tokens = self.service.registry().tokens();
        if self.json {
            return self.print_json(&tokens);
        }

        info!("🪙 {} supported tokens on {}:", tokens.len(), self.service.network().name);
        for token in tokens {
            info!(
                "   {} ({}) - {} decimals - {}",
                token.symbol, token.name, token.decimals, token.address
            );
        }
        Ok(())
    }

    async fn execute_pools_command(&self, owner: Option<Address>) -> Result<(), AppError> {
        let owner = owner.or(self.default_owner);
        let pools = self.service.list_pools(owner).await;
        let reports: Vec<PoolReport> = pools.iter().map(PoolReport::from).collect();
        if self.json {
            return self.print_json(&reports);
        }

        for pool in &reports {
            info!(
                "📊 {}-{}: {} {} / {} {}",
                pool.token_a.symbol,
                pool.token_b.symbol,
                pool.reserve_a,
                pool.token_a.symbol,
                pool.reserve_b,
                pool.token_b.symbol
            );
            if let Some(liquidity) = &pool.user_liquidity {
                info!("   Your liquidity: {}", liquidity);
            }
        }
        Ok(())
    }

    async fn execute_quote_command(
        &self,
        from: &str,
        to: &str,
        amount: &str,
        owner: Option<Address>,
    ) -> Result<(), AppError> {
        let registry = self.service.registry();
        let token_in = registry.by_symbol(from)?;
        let token_out = registry.by_symbol(to)?;
        let amount_in = parse_units(amount, token_in.decimals)?;

        let session = self.session(owner);
        let preview = self
            .service
            .preview_swap(&session, token_in, token_out, amount_in)
            .await?;
        let report = SwapReport::from_preview(&preview, amount_in);
        if self.json {
            return self.print_json(&report);
        }

        match (&report.amount_out, &report.price_impact_percent) {
            (Some(amount_out), Some(impact)) => {
                info!("💱 {} {} -> {} {}", report.amount_in, from, amount_out, to);
                info!("   Price impact: {}%", impact);
            }
            _ => warn!("⚠️  No liquidity for {}-{}", from, to),
        }
        if let Some(rate) = &report.exchange_rate {
            info!("   Rate: 1 {} = {} {}", from, rate, to);
        }
        info!("   Status: {}", report.readiness);
        Ok(())
    }

    async fn execute_watch_command(
        &self,
        from: &str,
        to: &str,
        amount: &str,
        owner: Option<Address>,
        seconds: u64,
    ) -> Result<(), AppError> {
        let registry = self.service.registry();
        let token_in = registry.by_symbol(from)?.clone();
        let token_out = registry.by_symbol(to)?.clone();
        let amount_in = parse_units(amount, token_in.decimals)?;
        let live = LiveSwapQuote::new(token_in, token_out)?.with_fee(self.service.fee());
        let session = self.session(owner);

        let period = Duration::from_secs(seconds.max(1));
        info!("👀 Quoting {} {} -> {} every {}s (Ctrl+C to stop)", amount, from, to, period.as_secs());
        self.watch(&live, &session, amount_in, period, tokio::signal::ctrl_c())
            .await
    }

    /// Re-quote every `period` until `shutdown` resolves, also while a
    /// refresh is in flight.
    async fn watch<F: Future>(
        &self,
        live: &LiveSwapQuote,
        session: &WalletSession,
        amount_in: U256,
        period: Duration,
        shutdown: F,
    ) -> Result<(), AppError> {
        tokio::pin!(shutdown);
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            let tick = async {
                live.refresh(&self.service).await?;
                self.watch_tick(live, session, amount_in).await
            };
            tokio::select! {
                _ = &mut shutdown => break,
                result = tick => match result {
                    Ok(Some(tick)) => self.log_watch_tick(live, amount_in, &tick),
                    Ok(None) => {}
                    Err(e) => warn!("❌ Refresh failed: {}", e),
                },
            }
        }
        info!("🛑 Stopped");
        Ok(())
    }

    /// Quote against the latest snapshot and gate it for the session owner.
    async fn watch_tick(
        &self,
        live: &LiveSwapQuote,
        session: &WalletSession,
        amount_in: U256,
    ) -> Result<Option<WatchTick>, AppError> {
        let (Some(outcome), Some(reserves)) = (live.quote(amount_in).await?, live.reserves().await) else {
            return Ok(None);
        };
        let amount_out = match outcome.quote() {
            Some(quote) => Some(self.service.confirm_amount_out(quote, &reserves).await?),
            None => None,
        };
        let funds = self
            .service
            .funds(live.token_in(), session.account())
            .await?
            .unwrap_or_default();
        let readiness = swap_readiness(
            session,
            self.service.network().chain_id,
            &outcome,
            amount_in,
            funds.balance,
            funds.allowance,
        );
        Ok(Some(WatchTick {
            outcome,
            amount_out,
            readiness,
        }))
    }

    fn log_watch_tick(&self, live: &LiveSwapQuote, amount_in: U256, tick: &WatchTick) {
        let token_in = live.token_in();
        let token_out = live.token_out();
        match (tick.outcome.quote(), tick.amount_out) {
            (Some(quote), Some(amount_out)) => info!(
                "💱 {} {} -> {} {} (impact {}%) - {}",
                format_units(amount_in, token_in.decimals),
                token_in.symbol,
                format_units(amount_out, token_out.decimals),
                token_out.symbol,
                format_bps(quote.price_impact_bps),
                tick.readiness.label()
            ),
            _ => warn!("⚠️  No liquidity for {}-{}", token_in.symbol, token_out.symbol),
        }
    }

    async fn execute_withdraw_command(
        &self,
        token_a: &str,
        token_b: &str,
        percentage: u8,
        owner: Option<Address>,
    ) -> Result<(), AppError> {
        let registry = self.service.registry();
        let asset_a = registry.by_symbol(token_a)?;
        let asset_b = registry.by_symbol(token_b)?;
        let percentage = WithdrawalPercentage::new(percentage)?;

        let session = self.session(owner);
        let preview = self
            .service
            .preview_withdrawal(&session, asset_a, asset_b, percentage)
            .await?;
        let report = WithdrawalReport::from_preview(&preview);
        if self.json {
            return self.print_json(&report);
        }

        if percentage.get() != percentage.effective() {
            warn!("⚠️  Withdrawals are capped at {}% of the position", percentage.effective());
        }
        info!(
            "💧 Your liquidity: {} of {} total",
            report.user_liquidity,
            format_units(preview.total_liquidity, LIQUIDITY_DECIMALS)
        );
        info!("   Burn {} for {} {} + {} {}", report.liquidity_to_burn, report.amount_a, token_a, report.amount_b, token_b);
        if preview.readiness != WithdrawalReadiness::Ready {
            warn!("⚠️  Not ready: {:?}", preview.readiness);
        }
        Ok(())
    }

    async fn execute_deposit_command(
        &self,
        token_a: &str,
        token_b: &str,
        amount: &str,
        amount_b: Option<&str>,
        owner: Option<Address>,
    ) -> Result<(), AppError> {
        let registry = self.service.registry();
        let asset_a = registry.by_symbol(token_a)?;
        let asset_b = registry.by_symbol(token_b)?;
        let amount_a = parse_units(amount, asset_a.decimals)?;
        let amount_b = amount_b
            .map(|amount| parse_units(amount, asset_b.decimals))
            .transpose()?;

        let session = self.session(owner);
        let preview = self
            .service
            .preview_deposit(&session, asset_a, asset_b, amount_a, amount_b)
            .await?;
        let report = DepositReport::from_preview(&preview);
        if self.json {
            return self.print_json(&report);
        }

        match (&report.amount_b, &report.pool_ratio) {
            (Some(amount_b), Some(_)) => {
                info!("💧 Deposit {} {} with {} {}", report.amount_a, token_a, amount_b, token_b)
            }
            (Some(amount_b), None) => info!(
                "💧 Empty pool: {} {} with {} {} sets the initial ratio",
                report.amount_a, token_a, amount_b, token_b
            ),
            (None, _) => info!("💧 Empty pool: any {} amount sets the initial ratio", token_b),
        }
        if let (Some(balance_a), Some(balance_b)) = (&report.balance_a, &report.balance_b) {
            info!("   Balances: {} {} / {} {}", balance_a, token_a, balance_b, token_b);
        }
        info!("   Status: {}", report.readiness);
        Ok(())
    }

    async fn execute_trades_command(&self, owner: Option<Address>) -> Result<(), AppError> {
        let trader = owner.or(self.default_owner).ok_or_else(|| {
            AppError::InvalidInput("trades needs --owner or a [wallet] account".to_string())
        })?;
        let (total, trades) = self.service.trade_history(trader).await?;
        let report = TradeHistoryReport {
            trader: trader.to_string(),
            total,
            trades: trades.iter().map(TradeReport::from).collect(),
        };
        if self.json {
            return self.print_json(&report);
        }

        if report.trades.is_empty() {
            info!("📜 No trades for {}", trader);
            return Ok(());
        }
        for trade in &report.trades {
            let when = trade
                .executed_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();
            info!(
                "📜 {} {} {} -> {} {}",
                when, trade.amount_in, trade.token_in.symbol, trade.amount_out, trade.token_out.symbol
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amm::{ReservePair, TokenPair};
    use crate::domain::history::{TradeHistory, TradeRecord};
    use crate::domain::registry::{TokenRegistry, USDC_ADDRESS, USDT_ADDRESS};
    use crate::shared::errors::DexError;
    use async_trait::async_trait;

    fn owner() -> Address {
        Address::with_last_byte(0x42)
    }

    fn executor() -> CommandExecutor {
        CommandExecutor::new(&Config::default(), Arc::new(reader()), true).unwrap()
    }

    fn reader() -> StaticDexReader {
        let mut reader = StaticDexReader::new(Address::ZERO);
        let pair = reader
            .with_pool(
                USDT_ADDRESS,
                USDC_ADDRESS,
                U256::from(100_000_000u64),
                U256::from(50_000_000u64),
                U256::from(10u64).pow(U256::from(18u64)),
            )
            .unwrap();
        reader.set_position(pair, owner(), U256::from(10u64).pow(U256::from(17u64)));
        reader.set_account(USDT_ADDRESS, owner(), U256::from(5_000_000u64), U256::from(1_000_000u64));
        reader.record_trade(TradeRecord {
            trader: owner(),
            token_in: USDT_ADDRESS,
            token_out: USDC_ADDRESS,
            amount_in: U256::from(1_000_000u64),
            amount_out: U256::from(493_579u64),
            timestamp: 1_741_600_000,
        });
        reader
    }

    /// Serves everything from a snapshot except pool reserves, which never arrive.
    struct StalledReader(StaticDexReader);

    #[async_trait]
    impl DexReader for StalledReader {
        fn dex_address(&self) -> Address {
            self.0.dex_address()
        }

        async fn pool_reserves(&self, _pair: TokenPair) -> Result<ReservePair, DexError> {
            futures::future::pending().await
        }

        async fn total_liquidity(&self, pair: TokenPair) -> Result<U256, DexError> {
            self.0.total_liquidity(pair).await
        }

        async fn user_liquidity(&self, pair: TokenPair, owner: Address) -> Result<U256, DexError> {
            self.0.user_liquidity(pair, owner).await
        }

        async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
            self.0.token_balance(token, owner).await
        }

        async fn allowance(&self, token: Address, owner: Address) -> Result<U256, DexError> {
            self.0.allowance(token, owner).await
        }

        async fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, DexError> {
            self.0.amount_out(amount_in, reserve_in, reserve_out).await
        }

        async fn trade_history(&self, trader: Address, limit: u64) -> Result<TradeHistory, DexError> {
            self.0.trade_history(trader, limit).await
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from([
            "seismint-amm",
            "--json",
            "withdraw",
            "--token-a",
            "USDT",
            "--token-b",
            "USDC",
            "--percentage",
            "50",
            "--owner",
            "0x0000000000000000000000000000000000000042",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Withdraw { percentage, owner: parsed, .. } => {
                assert_eq!(percentage, 50);
                assert_eq!(parsed, Some(owner()));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["seismint-amm", "pools", "--owner", "nope"]).is_err());

        let cli = Cli::parse_from([
            "seismint-amm",
            "quote",
            "--from",
            "USDT",
            "--to",
            "USDC",
            "--amount",
            "1",
            "--watch",
            "5",
            "--owner",
            "0x0000000000000000000000000000000000000042",
        ]);
        match cli.command {
            Commands::Quote { owner: parsed, watch, .. } => {
                assert_eq!(parsed, Some(owner()));
                assert_eq!(watch, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from([
            "seismint-amm",
            "trades",
            "--owner",
            "0x0000000000000000000000000000000000000042",
        ]);
        assert!(matches!(cli.command, Commands::Trades { owner: Some(parsed) } if parsed == owner()));
    }

    #[tokio::test]
    async fn test_execute_commands() {
        let executor = executor();
        executor.execute(Commands::Tokens).await.unwrap();
        executor.execute(Commands::Pools { owner: Some(owner()) }).await.unwrap();
        executor
            .execute(Commands::Quote {
                from: "usdt".into(),
                to: "USDC".into(),
                amount: "1.5".into(),
                owner: None,
                watch: None,
            })
            .await
            .unwrap();
        executor
            .execute(Commands::Withdraw {
                token_a: "USDT".into(),
                token_b: "USDC".into(),
                percentage: 100,
                owner: Some(owner()),
            })
            .await
            .unwrap();
        executor
            .execute(Commands::Deposit {
                token_a: "USDC".into(),
                token_b: "USDT".into(),
                amount: "10".into(),
                amount_b: None,
                owner: Some(owner()),
            })
            .await
            .unwrap();
        executor
            .execute(Commands::Trades { owner: Some(owner()) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let executor = executor();

        let unknown = executor
            .execute(Commands::Deposit {
                token_a: "DAI".into(),
                token_b: "USDT".into(),
                amount: "1".into(),
                amount_b: None,
                owner: None,
            })
            .await;
        assert!(matches!(unknown, Err(AppError::InvalidInput(_))));

        let zero = executor
            .execute(Commands::Withdraw {
                token_a: "USDT".into(),
                token_b: "USDC".into(),
                percentage: 0,
                owner: Some(owner()),
            })
            .await;
        assert!(matches!(zero, Err(AppError::InvalidInput(_))));

        let too_precise = executor
            .execute(Commands::Quote {
                from: "USDT".into(),
                to: "USDC".into(),
                amount: "0.0000001".into(),
                owner: None,
                watch: None,
            })
            .await;
        assert!(matches!(too_precise, Err(AppError::InvalidInput(_))));

        let no_trader = executor.execute(Commands::Trades { owner: None }).await;
        assert!(matches!(no_trader, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_watch_tick_gates_for_owner() {
        let executor = executor();
        let registry = TokenRegistry::seismic_devnet();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let usdc = registry.by_symbol("USDC").unwrap().clone();
        let live = LiveSwapQuote::new(usdt, usdc).unwrap();
        let amount_in = U256::from(1_000_000u64);

        let session = executor.session(Some(owner()));
        assert_eq!(executor.watch_tick(&live, &session, amount_in).await.unwrap(), None);

        live.refresh(&executor.service).await.unwrap();
        let tick = executor.watch_tick(&live, &session, amount_in).await.unwrap().unwrap();
        assert_eq!(tick.amount_out, Some(U256::from(493_579u64)));
        assert_eq!(tick.readiness, SwapReadiness::Ready);

        // Above the 1 USDT allowance on record.
        let tick = executor
            .watch_tick(&live, &session, U256::from(2_000_000u64))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tick.readiness, SwapReadiness::NeedsApproval);

        let anonymous = executor.session(None);
        let tick = executor.watch_tick(&live, &anonymous, amount_in).await.unwrap().unwrap();
        assert_eq!(tick.readiness, SwapReadiness::NotConnected);
    }

    #[tokio::test]
    async fn test_watch_stops_during_stalled_refresh() {
        let executor =
            CommandExecutor::new(&Config::default(), Arc::new(StalledReader(reader())), true).unwrap();
        let registry = TokenRegistry::seismic_devnet();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let usdc = registry.by_symbol("USDC").unwrap().clone();
        let live = LiveSwapQuote::new(usdt, usdc).unwrap();
        let session = executor.session(Some(owner()));

        let watching = executor.watch(
            &live,
            &session,
            U256::from(1_000_000u64),
            Duration::from_secs(3600),
            tokio::time::sleep(Duration::from_millis(50)),
        );
        let stopped = tokio::time::timeout(Duration::from_secs(5), watching).await;
        assert!(matches!(stopped, Ok(Ok(()))));
    }
}
