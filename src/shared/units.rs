//! Exact conversion between decimal strings and token smallest units

use alloy_primitives::U256;

use crate::shared::errors::UnitsError;

/// Decimals of pool liquidity units, independent of the pooled assets.
pub const LIQUIDITY_DECIMALS: u8 = 18;

/// Parse a decimal string such as `"12.5"` into smallest units.
///
/// Rejects signs, exponents and more fractional digits than `decimals`.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let trimmed = value.trim();
    let invalid = || UnitsError::InvalidNumber(value.to_string());

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals {
            value: value.to_string(),
            decimals,
        });
    }

    let digits = format!(
        "{}{:0<width$}",
        if whole.is_empty() { "0" } else { whole },
        fraction,
        width = decimals as usize
    );
    U256::from_str_radix(&digits, 10).map_err(|_| UnitsError::Overflow(value.to_string()))
}

/// Render smallest units as a decimal string, trimming trailing zeros but
/// always keeping one fractional digit (`"1.0"`, `"0.125"`).
pub fn format_units(amount: U256, decimals: u8) -> String {
    let raw = amount.to_string();
    if decimals == 0 {
        return raw;
    }

    let decimals = decimals as usize;
    let padded = format!("{:0>width$}", raw, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Basis points rendered as a percentage with two decimals, e.g. `99 -> "0.99"`.
pub fn format_bps(bps: U256) -> String {
    let bps = bps.to_string();
    let padded = format!("{:0>3}", bps);
    let (whole, fraction) = padded.split_at(padded.len() - 2);
    format!("{whole}.{fraction}")
}

/// Serialize [`U256`] as a decimal string and deserialize it from a decimal
/// or a `0x`-prefixed hex string.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a u256 encoded as a decimal or 0x-prefixed hex string")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let s = s.trim();
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => U256::from_str_radix(hex, 16),
                    None => U256::from_str_radix(s, 10),
                };
                parsed.map_err(|err| E::custom(format!("failed to decode {s:?} as u256: {err}")))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(U256::from(v))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units("12.5", 6).unwrap(), U256::from(12_500_000u64));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25u64));
        assert_eq!(parse_units("7.", 0).unwrap(), U256::from(7u64));
        assert_eq!(parse_units("0.100", 1).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(matches!(parse_units("", 6), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_units("-1", 6), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_units("1e6", 6), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_units("1.2.3", 6), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(
            parse_units("0.0000001", 6),
            Err(UnitsError::TooManyDecimals { .. })
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1.0");
        assert_eq!(format_units(U256::from(1_337_000u64), 6), "1.337");
        assert_eq!(format_units(U256::from(125u64), 3), "0.125");
        assert_eq!(format_units(U256::from(5u64), 6), "0.000005");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(U256::from(99u64)), "0.99");
        assert_eq!(format_bps(U256::from(5u64)), "0.05");
        assert_eq!(format_bps(U256::from(10_000u64)), "100.00");
    }

    #[test]
    fn test_u256_decimal_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper(#[serde(with = "u256_decimal")] U256);

        let json = serde_json::to_string(&Wrapper(U256::from(1234u64))).unwrap();
        assert_eq!(json, "\"1234\"");

        let hex: Wrapper = serde_json::from_str("\"0xff\"").unwrap();
        assert_eq!(hex.0, U256::from(255u64));

        let number: Wrapper = serde_json::from_str("77").unwrap();
        assert_eq!(number.0, U256::from(77u64));
    }
}
