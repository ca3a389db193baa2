//! Seismint AMM - client-side accounting for a constant-product DEX
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::{CommandExecutor, ExchangeService};
pub use config::Config;
pub use domain::amm::{calculate_withdrawal, quote_swap, resolve_reserves};
pub use domain::registry::TokenRegistry;
pub use infrastructure::DexReader;
