//! Application layer - use cases and services

pub mod commands;
pub mod live_quote;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use live_quote::{LatestSnapshot, LiveSwapQuote};
pub use services::ExchangeService;
