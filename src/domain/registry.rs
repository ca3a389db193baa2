//! Static registry of the tokens the exchange supports

use alloy_primitives::{address, Address};
use std::collections::HashMap;

use crate::shared::errors::RegistryError;
use crate::shared::types::TokenAsset;

pub const USDT_ADDRESS: Address = address!("0x0B60c43f7430c4467D17dAcd0016d8537355AE18");
pub const USDC_ADDRESS: Address = address!("0x64174552B1E07762fe2bBbdFBe558177688667B1");

/// Immutable address -> asset mapping, resolved once per session.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenAsset>,
    by_address: HashMap<Address, usize>,
}

impl TokenRegistry {
    /// Build a registry, keeping registration order for listings.
    pub fn new(tokens: Vec<TokenAsset>) -> Result<Self, RegistryError> {
        let mut by_address = HashMap::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            if token.decimals > 18 {
                return Err(RegistryError::InvalidDecimals {
                    symbol: token.symbol.clone(),
                    decimals: token.decimals,
                });
            }
            if by_address.insert(token.address, index).is_some() {
                return Err(RegistryError::DuplicateAddress(token.address.to_string()));
            }
            let clash = tokens[..index]
                .iter()
                .any(|other| other.symbol.eq_ignore_ascii_case(&token.symbol));
            if clash {
                return Err(RegistryError::DuplicateSymbol(token.symbol.clone()));
            }
        }

        Ok(Self { tokens, by_address })
    }

    /// The devnet stablecoins.
    pub fn seismic_devnet() -> Self {
        let tokens = vec![
            TokenAsset::new(USDT_ADDRESS, "USDT", "Tether USD", 6).with_icon("/usdt.png"),
            TokenAsset::new(USDC_ADDRESS, "USDC", "USD Coin", 6).with_icon("/usdc.png"),
        ];
        let by_address = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| (token.address, index))
            .collect();
        Self { tokens, by_address }
    }

    pub fn get(&self, address: &Address) -> Option<&TokenAsset> {
        self.by_address.get(address).map(|&index| &self.tokens[index])
    }

    pub fn by_symbol(&self, symbol: &str) -> Result<&TokenAsset, RegistryError> {
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| RegistryError::UnknownSymbol(symbol.to_string()))
    }

    pub fn by_address(&self, address: &Address) -> Result<&TokenAsset, RegistryError> {
        self.get(address)
            .ok_or_else(|| RegistryError::UnknownAddress(address.to_string()))
    }

    pub fn tokens(&self) -> &[TokenAsset] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Every unordered pair of registered tokens, in registration order.
    pub fn pairs(&self) -> Vec<(&TokenAsset, &TokenAsset)> {
        let mut pairs = Vec::new();
        for (i, a) in self.tokens.iter().enumerate() {
            for b in &self.tokens[i + 1..] {
                pairs.push((a, b));
            }
        }
        pairs
    }
}
