//! Wallet session handle passed explicitly to the application services

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WalletSession {
    #[default]
    Disconnected,
    Connected { account: Address, chain_id: u64 },
}

impl WalletSession {
    pub fn connect(account: Address, chain_id: u64) -> Self {
        WalletSession::Connected { account, chain_id }
    }

    pub fn disconnect(&mut self) {
        *self = WalletSession::Disconnected;
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            WalletSession::Connected { account, .. } => Some(*account),
            WalletSession::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, WalletSession::Connected { .. })
    }

    /// False when disconnected or connected to another chain.
    pub fn on_expected_chain(&self, expected: u64) -> bool {
        matches!(self, WalletSession::Connected { chain_id, .. } if *chain_id == expected)
    }
}
