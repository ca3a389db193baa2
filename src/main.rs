use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use seismint_amm::application::{Cli, CommandExecutor};
use seismint_amm::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    // Config file if given, devnet defaults otherwise; CLI flags win over both
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let executor = CommandExecutor::from_cli(&cli, config)?;
    executor.execute(cli.command.clone()).await?;
    Ok(())
}
