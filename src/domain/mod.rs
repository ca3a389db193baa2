//! Domain layer - AMM accounting, token registry, trade history and wallet session

pub mod amm;
pub mod history;
pub mod registry;
pub mod session;
