//! Sale reconstruction engine for the legacy exchange.
//!
//! The exchange settles every sale through one generic "atomic match" call
//! whose byte arrays encode the actual asset movement. Reconstructing what
//! sold, and for how much, takes three steps that live here:
//! - merge the buy-side calldata template with the sell-side concrete
//!   calldata under the order's replacement pattern ([`merge`])
//! - decode the merged calldata into (contract, token id) pairs, for both
//!   plain transfers and atomicized bundles ([`calldata`])
//! - recompute the settlement price from the order's fee and auction
//!   parameters ([`pricing`])

pub mod calldata;
pub mod merge;
pub mod order;
pub mod pricing;

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// One decoded (target contract, token id) pair from a sale's calldata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferRef {
    pub contract: Address,
    pub token_id: U256,
}

/// Failure to decode exchange calldata. Always recovered locally: a decode
/// error means "not a sale we can attribute", never a processor fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("calldata too short: need {need} bytes, have {have}")]
    TooShort { need: usize, have: usize },

    #[error("malformed atomicized frame: {0}")]
    BadFrame(&'static str),

    #[error("length word does not fit in usize")]
    LengthOverflow,

    #[error("unexpected flag value {value} for {field}")]
    BadFlag { field: &'static str, value: u8 },
}
