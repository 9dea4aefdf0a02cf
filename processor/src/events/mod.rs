//! Event decoders for the marketplace indexer
//!
//! This module contains decoders for the two critical log streams:
//! - Transfer: NFT movements (ERC-721 transfers)
//! - OrdersMatched: exchange settlement confirmations
//!
//! Atomic match call traces arrive through their own queue and are decoded
//! by the `atomic_match` module.

pub mod atomic_match;
pub mod orders_matched;
pub mod transfer;

use market_db::entity::evm_logs::EvmLogs;

use crate::{error::AppError, utils};

/// Event topics (keccak256 hashes)
pub mod topics {
    /// Transfer(address indexed from, address indexed to, uint256 indexed tokenId)
    pub const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
    /// OrdersMatched(bytes32 buyHash, bytes32 sellHash, address indexed maker, address indexed taker, uint price, bytes32 indexed metadata)
    pub const ORDERS_MATCHED: &str = "0xc4109843e0b7d514e4c093114b863f8e7d8d9a458c372cd51bfe526b588006c9";
}

/// A decoded marketplace event, ready for its handler
pub enum MarketEvent {
    Transfer(transfer::TransferEvent),
    OrdersMatched(orders_matched::OrdersMatchedEvent),
}

/// Decode a log into a typed event based on its event signature
pub fn decode_event(log: &EvmLogs) -> Result<MarketEvent, AppError> {
    let topic0 = format!("0x{}", utils::vec_to_hex(log.event_signature.to_vec()));

    match topic0.as_str() {
        topics::TRANSFER => Ok(MarketEvent::Transfer(transfer::decode(log)?)),
        topics::ORDERS_MATCHED => Ok(MarketEvent::OrdersMatched(orders_matched::decode(log)?)),
        _ => Err(AppError::UnknownEventTopic(topic0)),
    }
}
