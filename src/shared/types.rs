//! Common types used across the application

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Fungible token tradable on the exchange
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAsset {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(default)]
    pub icon: Option<String>,
}

impl TokenAsset {
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}

/// Network the exchange is deployed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

impl NetworkInfo {
    pub fn seismic_devnet() -> Self {
        Self {
            name: "Seismic devnet".to_string(),
            chain_id: 5124,
            rpc_url: "https://node-2.seismicdev.net/rpc".to_string(),
            explorer_url: Some("https://explorer-2.seismicdev.net/".to_string()),
        }
    }
}
