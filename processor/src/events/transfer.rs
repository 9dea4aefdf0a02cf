//! NFT Transfer event decoder
//!
//! Event signature: Transfer(address indexed from, address indexed to, uint256 indexed tokenId)
//! Topic0: 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! The ERC-721 variant indexes the token id, so the event carries four
//! topics and no data. Three-topic (ERC-20) transfers fail the decode and
//! are skipped upstream.

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use market_db::entity::evm_logs::EvmLogs;
use serde::Serialize;

use crate::{error::AppError, utils};

/// Decoded Transfer event payload
#[derive(Debug, Serialize)]
pub struct TransferEvent {
    /// NFT contract address (the log emitter)
    pub token_contract: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Token number (decimal string, full uint256 width)
    pub token_number: String,
    /// Transaction hash
    pub tx_hash: String,
    /// Recipient of the enclosing transaction
    pub transaction_to: Option<String>,
    /// Position of the log within its transaction
    pub log_index: i32,
    /// Block number
    pub block_number: i64,
    /// Block timestamp
    pub block_timestamp: DateTime<Utc>,
}

/// Decode a Transfer event from raw log data
///
/// Topics layout:
/// - topics[0]: event signature
/// - topics[1]: from (indexed)
/// - topics[2]: to (indexed)
/// - topics[3]: tokenId (indexed)
pub fn decode(log: &EvmLogs) -> Result<TransferEvent, AppError> {
    // Ensure we have enough topics (ERC-20 transfers carry only 3)
    if log.topics.len() < 4 {
        return Err(AppError::EventDecode(format!(
            "Transfer: expected 4 topics, got {}",
            log.topics.len()
        )));
    }

    for topic in &log.topics[1..4] {
        if topic.len() != 32 {
            return Err(AppError::EventDecode(format!(
                "Transfer: expected 32-byte topic, got {}",
                topic.len()
            )));
        }
    }

    // NFT contract address is the log emitter
    let token_contract = format!("0x{}", utils::vec_to_hex(log.address.to_vec()));

    // Extract from address from topics[1]
    let from = format!("0x{}", utils::vec_to_hex(log.topics[1][12..32].to_vec()));

    // Extract to address from topics[2]
    let to = format!("0x{}", utils::vec_to_hex(log.topics[2][12..32].to_vec()));

    // Extract token number from topics[3]
    let token_number = U256::from_be_slice(&log.topics[3]).to_string();

    let tx_hash = format!("0x{}", utils::vec_to_hex(log.transaction_hash.to_vec()));
    let transaction_to = log
        .transaction_to
        .as_ref()
        .map(|to| format!("0x{}", utils::vec_to_hex(to.to_vec())));

    Ok(TransferEvent {
        token_contract,
        from,
        to,
        token_number,
        tx_hash,
        transaction_to,
        log_index: log.log_index,
        block_number: log.block_number,
        block_timestamp: log.block_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_log(topics: Vec<Vec<u8>>) -> EvmLogs {
        EvmLogs {
            id: 1,
            address: vec![0x11; 20],
            event_signature: topics[0].clone(),
            topics,
            data: Vec::new(),
            block_number: 100,
            block_timestamp: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            transaction_hash: vec![0xcc; 32],
            transaction_to: Some(vec![0x22; 20]),
            log_index: 3,
        }
    }

    fn topic_word(fill: u8) -> Vec<u8> {
        let mut word = vec![0u8; 32];
        word[12..].copy_from_slice(&[fill; 20]);
        word
    }

    #[test]
    fn test_decode_nft_transfer() {
        let mut token_topic = vec![0u8; 32];
        token_topic[31] = 42;
        let log = sample_log(vec![
            vec![0xdd; 32],
            topic_word(0xaa),
            topic_word(0xbb),
            token_topic,
        ]);

        let event = decode(&log).unwrap();
        assert_eq!(event.token_contract, format!("0x{}", "11".repeat(20)));
        assert_eq!(event.from, format!("0x{}", "aa".repeat(20)));
        assert_eq!(event.to, format!("0x{}", "bb".repeat(20)));
        assert_eq!(event.token_number, "42");
        assert_eq!(event.transaction_to, Some(format!("0x{}", "22".repeat(20))));
        assert_eq!(event.log_index, 3);
    }

    #[test]
    fn test_decode_rejects_erc20_shaped_transfer() {
        let log = sample_log(vec![vec![0xdd; 32], topic_word(0xaa), topic_word(0xbb)]);
        assert!(decode(&log).is_err());
    }
}
