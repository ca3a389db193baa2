//! Canonically ordered token pair

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Two distinct token addresses, lower address first.
///
/// Byte order of an address is the same as case-insensitive order of its hex
/// string, which is how the DEX contract keys its pools.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TokenPair(Address, Address);

impl TokenPair {
    /// Returns `None` when both addresses are equal.
    pub fn new(token_a: Address, token_b: Address) -> Option<Self> {
        match token_a.cmp(&token_b) {
            Ordering::Less => Some(Self(token_a, token_b)),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self(token_b, token_a)),
        }
    }

    pub fn first(&self) -> Address {
        self.0
    }

    pub fn second(&self) -> Address {
        self.1
    }

    pub fn get(&self) -> (Address, Address) {
        (self.0, self.1)
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.0 == *token || self.1 == *token
    }

    /// The other token of the pair, or `None` if `token` is not part of it.
    pub fn other(&self, token: &Address) -> Option<Address> {
        if self.0 == *token {
            Some(self.1)
        } else if self.1 == *token {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}
