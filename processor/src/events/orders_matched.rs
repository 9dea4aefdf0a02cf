//! Exchange settlement event decoder
//!
//! Event signature: OrdersMatched(bytes32 buyHash, bytes32 sellHash, address indexed maker, address indexed taker, uint price, bytes32 indexed metadata)
//! Topic0: 0xc4109843e0b7d514e4c093114b863f8e7d8d9a458c372cd51bfe526b588006c9

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use market_db::entity::evm_logs::EvmLogs;
use serde::Serialize;

use crate::{error::AppError, utils};

/// Decoded OrdersMatched event payload
#[derive(Debug, Serialize)]
pub struct OrdersMatchedEvent {
    /// Maker of the matched pair
    pub maker: String,
    /// Taker of the matched pair
    pub taker: String,
    /// Total settlement price in wei (decimal string, full uint256 width)
    pub price_wei: String,
    /// Transaction hash, the correlation key to the pending sale wrapper
    pub tx_hash: String,
    /// Block number
    pub block_number: i64,
    /// Block timestamp
    pub block_timestamp: DateTime<Utc>,
}

/// Decode an OrdersMatched event from raw log data
///
/// Topics layout:
/// - topics[0]: event signature
/// - topics[1]: maker (indexed)
/// - topics[2]: taker (indexed)
/// - topics[3]: metadata (indexed, unused here)
///
/// Data layout (each 32 bytes):
/// - bytes 0-32: buyHash
/// - bytes 32-64: sellHash
/// - bytes 64-96: price
pub fn decode(log: &EvmLogs) -> Result<OrdersMatchedEvent, AppError> {
    // Ensure we have enough topics
    if log.topics.len() < 3 {
        return Err(AppError::EventDecode(format!(
            "OrdersMatched: expected at least 3 topics, got {}",
            log.topics.len()
        )));
    }

    // Ensure data is long enough (buyHash + sellHash + price)
    if log.data.len() < 96 {
        return Err(AppError::EventDecode(format!(
            "OrdersMatched: expected at least 96 bytes of data, got {}",
            log.data.len()
        )));
    }

    // Extract maker from topics[1]
    let maker = format!("0x{}", utils::vec_to_hex(log.topics[1][12..32].to_vec()));

    // Extract taker from topics[2]
    let taker = format!("0x{}", utils::vec_to_hex(log.topics[2][12..32].to_vec()));

    // Extract price from the third data word
    let price_wei = U256::from_be_slice(&log.data[64..96]).to_string();

    let tx_hash = format!("0x{}", utils::vec_to_hex(log.transaction_hash.to_vec()));

    Ok(OrdersMatchedEvent {
        maker,
        taker,
        price_wei,
        tx_hash,
        block_number: log.block_number,
        block_timestamp: log.block_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_reads_price_from_third_data_word() {
        let mut data = vec![0u8; 96];
        // 400 encoded big-endian in the third 32-byte word: 400 = 1*256 + 144
        data[94] = 1;
        data[95] = 144;
        let mut maker = vec![0u8; 32];
        maker[12..].copy_from_slice(&[0xaa; 20]);
        let mut taker = vec![0u8; 32];
        taker[12..].copy_from_slice(&[0xbb; 20]);

        let log = EvmLogs {
            id: 1,
            address: vec![0x7b; 20],
            event_signature: vec![0xc4; 32],
            topics: vec![vec![0xc4; 32], maker, taker, vec![0u8; 32]],
            data,
            block_number: 100,
            block_timestamp: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            transaction_hash: vec![0xcc; 32],
            transaction_to: Some(vec![0x7b; 20]),
            log_index: 7,
        };

        let event = decode(&log).unwrap();
        assert_eq!(event.price_wei, "400");
        assert_eq!(event.maker, format!("0x{}", "aa".repeat(20)));
        assert_eq!(event.tx_hash, format!("0x{}", "cc".repeat(32)));
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let log = EvmLogs {
            id: 1,
            address: vec![0x7b; 20],
            event_signature: vec![0xc4; 32],
            topics: vec![vec![0xc4; 32], vec![0u8; 32], vec![0u8; 32]],
            data: vec![0u8; 64],
            block_number: 100,
            block_timestamp: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            transaction_hash: vec![0xcc; 32],
            transaction_to: None,
            log_index: 0,
        };

        assert!(decode(&log).is_err());
    }
}
