use alloy_primitives::{address, Address};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::domain::amm::SwapFee;
use crate::domain::registry::TokenRegistry;
use crate::shared::errors::RegistryError;
use crate::shared::types::{NetworkInfo, TokenAsset};

/// SimpleDex deployment on the Seismic devnet.
pub const SIMPLE_DEX_ADDRESS: Address = address!("0x2A643B85151C3Ad51F76aa09dBC477a6Db85277F");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexCfg {
    pub address: Address,
    /// Swap fee used for local quotes, the devnet 3/1000 when absent.
    #[serde(default)]
    pub fee: Option<SwapFee>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletCfg {
    /// Account used when a command takes no `--owner`.
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkInfo,
    pub dex: DexCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenAsset>,
}

fn default_tokens() -> Vec<TokenAsset> {
    TokenRegistry::seismic_devnet().tokens().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkInfo::seismic_devnet(),
            dex: DexCfg {
                address: SIMPLE_DEX_ADDRESS,
                fee: None,
            },
            wallet: WalletCfg::default(),
            tokens: default_tokens(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Self = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        cfg.registry().context("invalid [[tokens]] table")?;
        if let Some(fee) = cfg.dex.fee {
            if !fee.is_valid() {
                bail!("invalid [dex] fee {}/{}", fee.numerator, fee.denominator);
            }
        }
        Ok(cfg)
    }

    pub fn registry(&self) -> Result<TokenRegistry, RegistryError> {
        TokenRegistry::new(self.tokens.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{USDC_ADDRESS, USDT_ADDRESS};

    #[test]
    fn test_default_is_devnet() {
        let cfg = Config::default();
        assert_eq!(cfg.network.chain_id, 5124);
        assert_eq!(cfg.dex.address, SIMPLE_DEX_ADDRESS);
        assert_eq!(cfg.wallet.account, None);

        let registry = cfg.registry().unwrap();
        assert_eq!(registry.by_symbol("USDT").unwrap().address, USDT_ADDRESS);
        assert_eq!(registry.by_symbol("USDC").unwrap().address, USDC_ADDRESS);
    }

    #[test]
    fn test_parse_toml() {
        let s = r#"
            [network]
            name = "Local"
            chain_id = 31337
            rpc_url = "http://127.0.0.1:8545"

            [dex]
            address = "0x0000000000000000000000000000000000000abc"
            fee = { numerator = 25, denominator = 10000 }

            [wallet]
            account = "0x0000000000000000000000000000000000000042"

            [[tokens]]
            address = "0x0000000000000000000000000000000000000001"
            symbol = "AAA"
            name = "Token A"
            decimals = 18

            [[tokens]]
            address = "0x0000000000000000000000000000000000000002"
            symbol = "BBB"
            name = "Token B"
            decimals = 6
            icon = "/bbb.png"
        "#;
        let cfg: Config = toml::from_str(s).unwrap();
        assert_eq!(cfg.network.chain_id, 31337);
        assert_eq!(cfg.network.explorer_url, None);
        assert_eq!(cfg.dex.fee.map(|fee| fee.bps()), Some(25));
        assert_eq!(cfg.wallet.account, Some(Address::with_last_byte(0x42)));
        assert_eq!(cfg.tokens.len(), 2);
        assert_eq!(cfg.tokens[1].icon.as_deref(), Some("/bbb.png"));
        assert_eq!(cfg.registry().unwrap().len(), 2);
    }

    #[test]
    fn test_tokens_default_to_devnet() {
        let s = r#"
            [network]
            name = "Seismic devnet"
            chain_id = 5124
            rpc_url = "https://node-2.seismicdev.net/rpc"

            [dex]
            address = "0x2A643B85151C3Ad51F76aa09dBC477a6Db85277F"
        "#;
        let cfg: Config = toml::from_str(s).unwrap();
        assert_eq!(cfg.dex.address, SIMPLE_DEX_ADDRESS);
        assert_eq!(cfg.dex.fee, None);
        assert_eq!(cfg.tokens.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_tokens() {
        let mut cfg = Config::default();
        cfg.tokens.push(cfg.tokens[0].clone());
        assert!(matches!(cfg.registry(), Err(RegistryError::DuplicateAddress(_))));
    }

    #[test]
    fn test_rejects_invalid_fee() {
        let path = std::env::temp_dir().join(format!("seismint-amm-fee-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            [network]
            name = "Local"
            chain_id = 31337
            rpc_url = "http://127.0.0.1:8545"

            [dex]
            address = "0x0000000000000000000000000000000000000abc"
            fee = { numerator = 3, denominator = 0 }
            "#,
        )
        .unwrap();
        let result = Config::from_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
