//! Numeric codecs for index payloads.
//!
//! The event index serialises `uint256` and `BigInt` values as decimal strings
//! (occasionally as JSON numbers or `0x` hex). Use these modules with
//! `#[serde(with = "...")]`.

use crate::errors::ParseError;
use primitive_types::U256;
use serde::Deserialize;
use uint::FromDecStrErr;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// Parses a decimal or `0x`-prefixed hexadecimal `u64`.
pub fn parse_u64(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|e| ParseError::Invalid(format!("{text}: {e}")))
}

/// Parses a decimal or `0x`-prefixed hexadecimal `U256`.
pub fn parse_u256(text: &str) -> Result<U256, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    match text.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16)
            .map_err(|e| ParseError::Invalid(format!("{text}: {e:?}"))),
        None => U256::from_dec_str(text).map_err(|e| match e {
            FromDecStrErr::InvalidLength => ParseError::Overflow(text.to_string()),
            FromDecStrErr::InvalidCharacter => ParseError::Invalid(text.to_string()),
        }),
    }
}

/// `u64` carried as a decimal string.
pub mod decimal_u64 {
    use super::{parse_u64, StringOrNumber};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialises as a decimal string.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accepts a decimal string, a hex string or a JSON number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::String(s) => parse_u64(&s).map_err(de::Error::custom),
        }
    }
}

/// `U256` carried as a decimal string.
pub mod decimal_u256 {
    use super::{parse_u256, StringOrNumber};
    use primitive_types::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialises as a decimal string.
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accepts a decimal string, a hex string or a JSON number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => Ok(U256::from(n)),
            StringOrNumber::String(s) => parse_u256(&s).map_err(de::Error::custom),
        }
    }
}
