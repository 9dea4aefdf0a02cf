//! Byte and numeric conversion helpers shared by decoders and handlers

use alloy::primitives::{Address, U256};
use sqlx::types::BigDecimal;
use std::str::FromStr;

/// Render raw bytes as a lowercase hex string (no 0x prefix)
pub fn vec_to_hex(bytes: Vec<u8>) -> String {
    alloy::hex::encode(bytes)
}

/// Lowercase 0x-prefixed hex for a typed address
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", alloy::hex::encode(address.as_slice()))
}

/// Address from the low 20 bytes of a 32-byte word. Shorter slices decode
/// to the zero address rather than panicking.
pub fn word_to_address(word: &[u8]) -> Address {
    if word.len() < 20 {
        return Address::ZERO;
    }
    Address::from_slice(&word[word.len() - 20..])
}

/// Convert a U256 wei amount to BigDecimal for NUMERIC storage
pub fn u256_to_bigdecimal(value: &U256) -> BigDecimal {
    // U256 renders as plain decimal digits, which BigDecimal always parses
    BigDecimal::from_str(&value.to_string()).unwrap_or(BigDecimal::from(0))
}
