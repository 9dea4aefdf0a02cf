//! Atomic match call decoder
//!
//! Function: atomicMatch_(address[14],uint[18],uint8[8],bytes,bytes,bytes,bytes,bytes,bytes,uint8[2],bytes32[5])
//! Selector: 0xab834bab
//!
//! Call traces are delivered through their own queue; this module turns a
//! raw trace into the typed call plus its chain coordinates. The heavy
//! lifting (positional array extraction) lives in `exchange::order`.

use chrono::{DateTime, Utc};
use market_db::entity::evm_call_traces::EvmCallTraces;

use crate::{
    error::AppError,
    exchange::order::{self, AtomicMatchCall},
    utils,
};

/// atomicMatch_ function selector
pub const ATOMIC_MATCH_SELECTOR: [u8; 4] = [0xab, 0x83, 0x4b, 0xab];

/// Decoded atomic match call with its chain coordinates
#[derive(Debug)]
pub struct AtomicMatchEvent {
    pub call: AtomicMatchCall,
    pub tx_hash: String,
    pub block_number: i64,
    pub block_timestamp: DateTime<Utc>,
}

/// Decode an atomic match call from a raw call trace
pub fn decode(trace: &EvmCallTraces) -> Result<AtomicMatchEvent, AppError> {
    if trace.input.len() < 4 || trace.input[..4] != ATOMIC_MATCH_SELECTOR {
        return Err(AppError::EventDecode(
            "not an atomicMatch_ call".to_string(),
        ));
    }

    let call = order::decode_atomic_match(&trace.input)?;
    let tx_hash = format!("0x{}", utils::vec_to_hex(trace.transaction_hash.to_vec()));

    Ok(AtomicMatchEvent {
        call,
        tx_hash,
        block_number: trace.block_number,
        block_timestamp: trace.block_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::order::tests::{buy_order, encode_atomic_match, sell_order, BUYER, SELLER};
    use chrono::TimeZone;

    fn trace(input: Vec<u8>) -> EvmCallTraces {
        EvmCallTraces {
            id: 1,
            to_address: vec![0x7b; 20],
            input,
            block_number: 100,
            block_timestamp: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            transaction_hash: vec![0xcc; 32],
        }
    }

    #[test]
    fn test_decode_full_call_trace() {
        let input = encode_atomic_match(&buy_order(), &sell_order(), &[], &[], &[]);
        let event = decode(&trace(input)).unwrap();

        assert_eq!(event.call.buy.maker, BUYER);
        assert_eq!(event.call.sell.maker, SELLER);
        assert_eq!(event.tx_hash, format!("0x{}", "cc".repeat(32)));
        assert_eq!(event.block_number, 100);
    }

    #[test]
    fn test_decode_rejects_other_selectors() {
        let mut input = encode_atomic_match(&buy_order(), &sell_order(), &[], &[], &[]);
        input[0] = 0x00;
        assert!(decode(&trace(input)).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(decode(&trace(Vec::new())).is_err());
    }
}
