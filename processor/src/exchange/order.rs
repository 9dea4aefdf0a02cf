//! Typed view of the exchange's legacy "atomic match" call.
//!
//! The call carries both orders flattened into positional arrays:
//!
//! ```text
//! atomicMatch_(
//!     address[14] addrs,                      // both orders' address fields
//!     uint[18]    uints,                      // both orders' numeric fields
//!     uint8[8]    feeMethodsSidesKindsHowToCalls,
//!     bytes       calldataBuy,
//!     bytes       calldataSell,
//!     bytes       replacementPatternBuy,
//!     bytes       replacementPatternSell,
//!     bytes       staticExtradataBuy,
//!     bytes       staticExtradataSell,
//!     uint8[2]    vs,
//!     bytes32[5]  rssMetadata)
//! ```
//!
//! Index-to-field mapping (buy order first, sell order second):
//!
//! | array | buy | sell | field                |
//! |-------|-----|------|----------------------|
//! | addrs |  0  |  7   | exchange             |
//! | addrs |  1  |  8   | maker                |
//! | addrs |  2  |  9   | taker                |
//! | addrs |  3  | 10   | fee recipient        |
//! | addrs |  4  | 11   | call target          |
//! | addrs |  5  | 12   | static-call target   |
//! | addrs |  6  | 13   | payment token        |
//! | uints |  0  |  9   | maker relayer fee    |
//! | uints |  1  | 10   | taker relayer fee    |
//! | uints |  2  | 11   | maker protocol fee   |
//! | uints |  3  | 12   | taker protocol fee   |
//! | uints |  4  | 13   | base price           |
//! | uints |  5  | 14   | extra (auction delta)|
//! | uints |  6  | 15   | listing time         |
//! | uints |  7  | 16   | expiration time      |
//! | uints |  8  | 17   | salt                 |
//! | flags |  0  |  4   | fee method           |
//! | flags |  1  |  5   | side                 |
//! | flags |  2  |  6   | sale kind            |
//! | flags |  3  |  7   | how to call          |
//!
//! This module is the only place those indices appear; everything
//! downstream works with named fields.

use alloy::primitives::{Address, U256};

use super::merge::guarded_array_replace;
use super::pricing::{FeeMethod, SaleKind, Side};
use super::DecodeError;
use crate::utils;

const WORD: usize = 32;
const SELECTOR: usize = 4;

// word indices into the head of the argument region
const ADDRS_BASE: usize = 0; // 14 words
const UINTS_BASE: usize = 14; // 18 words
const FLAGS_BASE: usize = 32; // 8 words
const CALLDATA_BUY_HEAD: usize = 40;
const CALLDATA_SELL_HEAD: usize = 41;
const REPLACEMENT_PATTERN_BUY_HEAD: usize = 42;
/// Head words including the trailing vs / rssMetadata statics
const HEAD_WORDS: usize = 53;

// per-order offsets within each array slice
const ORDER_ADDRS: usize = 7;
const ORDER_UINTS: usize = 9;
const ORDER_FLAGS: usize = 4;

/// One side of a match, with the fields sale reconstruction needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOrder {
    pub maker: Address,
    pub taker: Address,
    pub fee_recipient: Address,
    pub target: Address,
    pub payment_token: Address,
    pub maker_relayer_fee: U256,
    pub taker_relayer_fee: U256,
    pub base_price: U256,
    pub extra: U256,
    pub listing_time: U256,
    pub expiration_time: U256,
    pub fee_method: FeeMethod,
    pub side: Side,
    pub sale_kind: SaleKind,
}

/// Decoded atomic match call: both orders plus the calldata buffers the
/// sale reconstruction runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicMatchCall {
    pub buy: ExchangeOrder,
    pub sell: ExchangeOrder,
    pub calldata_buy: Vec<u8>,
    pub calldata_sell: Vec<u8>,
    pub replacement_pattern_buy: Vec<u8>,
}

impl AtomicMatchCall {
    /// A sell order addressed to a specific counterparty is a private
    /// listing
    pub fn is_private(&self) -> bool {
        self.sell.taker != Address::ZERO
    }

    /// The calldata that actually executed: buy-side template merged with
    /// the sell-side concrete bytes under the buy replacement pattern
    pub fn effective_calldata(&self) -> Vec<u8> {
        guarded_array_replace(
            &self.calldata_buy,
            &self.calldata_sell,
            &self.replacement_pattern_buy,
        )
    }
}

fn word(args: &[u8], index: usize) -> Result<&[u8], DecodeError> {
    let start = index * WORD;
    args.get(start..start + WORD).ok_or(DecodeError::TooShort {
        need: start + WORD,
        have: args.len(),
    })
}

fn address_at(args: &[u8], index: usize) -> Result<Address, DecodeError> {
    Ok(utils::word_to_address(word(args, index)?))
}

fn uint_at(args: &[u8], index: usize) -> Result<U256, DecodeError> {
    Ok(U256::from_be_slice(word(args, index)?))
}

fn flag_at(args: &[u8], index: usize) -> Result<u8, DecodeError> {
    Ok(word(args, index)?[WORD - 1])
}

fn bytes_arg(args: &[u8], head_index: usize) -> Result<Vec<u8>, DecodeError> {
    let offset = usize::try_from(uint_at(args, head_index)?)
        .map_err(|_| DecodeError::LengthOverflow)?;
    let length_word = args.get(offset..offset + WORD).ok_or(DecodeError::TooShort {
        need: offset + WORD,
        have: args.len(),
    })?;
    let length = usize::try_from(U256::from_be_slice(length_word))
        .map_err(|_| DecodeError::LengthOverflow)?;

    let start = offset + WORD;
    let end = start.checked_add(length).ok_or(DecodeError::LengthOverflow)?;
    let bytes = args.get(start..end).ok_or(DecodeError::TooShort {
        need: end,
        have: args.len(),
    })?;

    Ok(bytes.to_vec())
}

fn order_at(args: &[u8], order_index: usize) -> Result<ExchangeOrder, DecodeError> {
    let addrs = ADDRS_BASE + order_index * ORDER_ADDRS;
    let uints = UINTS_BASE + order_index * ORDER_UINTS;
    let flags = FLAGS_BASE + order_index * ORDER_FLAGS;

    Ok(ExchangeOrder {
        maker: address_at(args, addrs + 1)?,
        taker: address_at(args, addrs + 2)?,
        fee_recipient: address_at(args, addrs + 3)?,
        target: address_at(args, addrs + 4)?,
        payment_token: address_at(args, addrs + 6)?,
        maker_relayer_fee: uint_at(args, uints)?,
        taker_relayer_fee: uint_at(args, uints + 1)?,
        base_price: uint_at(args, uints + 4)?,
        extra: uint_at(args, uints + 5)?,
        listing_time: uint_at(args, uints + 6)?,
        expiration_time: uint_at(args, uints + 7)?,
        fee_method: FeeMethod::from_flag(flag_at(args, flags)?)?,
        side: Side::from_flag(flag_at(args, flags + 1)?)?,
        sale_kind: SaleKind::from_flag(flag_at(args, flags + 2)?)?,
    })
}

/// Decode a raw `atomicMatch_` input (selector included) into named fields
pub fn decode_atomic_match(input: &[u8]) -> Result<AtomicMatchCall, DecodeError> {
    if input.len() < SELECTOR + HEAD_WORDS * WORD {
        return Err(DecodeError::TooShort {
            need: SELECTOR + HEAD_WORDS * WORD,
            have: input.len(),
        });
    }

    let args = &input[SELECTOR..];

    Ok(AtomicMatchCall {
        buy: order_at(args, 0)?,
        sell: order_at(args, 1)?,
        calldata_buy: bytes_arg(args, CALLDATA_BUY_HEAD)?,
        calldata_sell: bytes_arg(args, CALLDATA_SELL_HEAD)?,
        replacement_pattern_buy: bytes_arg(args, REPLACEMENT_PATTERN_BUY_HEAD)?,
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use alloy::primitives::address;

    pub const EXCHANGE: Address = address!("7be8076f4ea4a4ad08075c2508e481d6c946d12b");
    pub const NFT_CONTRACT: Address = address!("1111111111111111111111111111111111111111");
    pub const BUYER: Address = address!("00000000000000000000000000000000000000bb");
    pub const SELLER: Address = address!("00000000000000000000000000000000000000aa");

    /// Plain fixed-price, split-fee sell order against the NFT contract
    pub fn sell_order() -> ExchangeOrder {
        ExchangeOrder {
            maker: SELLER,
            taker: Address::ZERO,
            fee_recipient: EXCHANGE,
            target: NFT_CONTRACT,
            payment_token: Address::ZERO,
            maker_relayer_fee: U256::from(250u64),
            taker_relayer_fee: U256::ZERO,
            base_price: U256::from(1_000_000_000_000_000_000u64),
            extra: U256::ZERO,
            listing_time: U256::ZERO,
            expiration_time: U256::ZERO,
            fee_method: FeeMethod::SplitFee,
            side: Side::Sell,
            sale_kind: SaleKind::FixedPrice,
        }
    }

    /// Matching buy order for [`sell_order`]
    pub fn buy_order() -> ExchangeOrder {
        ExchangeOrder {
            maker: BUYER,
            side: Side::Buy,
            ..sell_order()
        }
    }

    fn uint_word(value: U256) -> [u8; 32] {
        value.to_be_bytes::<32>()
    }

    fn address_word(value: Address) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(value.as_slice());
        word
    }

    fn push_order_addrs(words: &mut Vec<[u8; 32]>, order: &ExchangeOrder) {
        words.push(address_word(EXCHANGE));
        words.push(address_word(order.maker));
        words.push(address_word(order.taker));
        words.push(address_word(order.fee_recipient));
        words.push(address_word(order.target));
        words.push(address_word(Address::ZERO)); // static-call target
        words.push(address_word(order.payment_token));
    }

    fn push_order_uints(words: &mut Vec<[u8; 32]>, order: &ExchangeOrder) {
        words.push(uint_word(order.maker_relayer_fee));
        words.push(uint_word(order.taker_relayer_fee));
        words.push(uint_word(U256::ZERO)); // maker protocol fee
        words.push(uint_word(U256::ZERO)); // taker protocol fee
        words.push(uint_word(order.base_price));
        words.push(uint_word(order.extra));
        words.push(uint_word(order.listing_time));
        words.push(uint_word(order.expiration_time));
        words.push(uint_word(U256::from(7u64))); // salt
    }

    fn push_order_flags(words: &mut Vec<[u8; 32]>, order: &ExchangeOrder) {
        let fee_method = match order.fee_method {
            FeeMethod::ProtocolFee => 0u64,
            FeeMethod::SplitFee => 1u64,
        };
        let side = match order.side {
            Side::Buy => 0u64,
            Side::Sell => 1u64,
        };
        let sale_kind = match order.sale_kind {
            SaleKind::FixedPrice => 0u64,
            SaleKind::DutchAuction => 1u64,
        };
        words.push(uint_word(U256::from(fee_method)));
        words.push(uint_word(U256::from(side)));
        words.push(uint_word(U256::from(sale_kind)));
        words.push(uint_word(U256::ZERO)); // how to call
    }

    /// Assemble full `atomicMatch_` input bytes for a buy/sell pair
    pub fn encode_atomic_match(
        buy: &ExchangeOrder,
        sell: &ExchangeOrder,
        calldata_buy: &[u8],
        calldata_sell: &[u8],
        replacement_pattern_buy: &[u8],
    ) -> Vec<u8> {
        let mut head: Vec<[u8; 32]> = Vec::with_capacity(HEAD_WORDS);
        push_order_addrs(&mut head, buy);
        push_order_addrs(&mut head, sell);
        push_order_uints(&mut head, buy);
        push_order_uints(&mut head, sell);
        push_order_flags(&mut head, buy);
        push_order_flags(&mut head, sell);

        // six bytes args follow; tail starts after the full head
        let mut tail: Vec<u8> = Vec::new();
        let tail_base = HEAD_WORDS * WORD;
        for bytes in [
            calldata_buy,
            calldata_sell,
            replacement_pattern_buy,
            &[][..], // replacementPatternSell
            &[][..], // staticExtradataBuy
            &[][..], // staticExtradataSell
        ] {
            head.push(uint_word(U256::from((tail_base + tail.len()) as u64)));
            tail.extend_from_slice(&uint_word(U256::from(bytes.len() as u64)));
            tail.extend_from_slice(bytes);
            // pad to a word boundary
            let rem = bytes.len() % WORD;
            if rem != 0 {
                tail.extend(std::iter::repeat(0u8).take(WORD - rem));
            }
        }

        // vs + rssMetadata statics
        for _ in 0..7 {
            head.push(uint_word(U256::ZERO));
        }
        assert_eq!(head.len(), HEAD_WORDS);

        let mut input = vec![0xab, 0x83, 0x4b, 0xab]; // atomicMatch_ selector
        for word in &head {
            input.extend_from_slice(word);
        }
        input.extend_from_slice(&tail);
        input
    }

    #[test]
    fn test_decode_extracts_named_fields_from_positional_arrays() {
        let input = encode_atomic_match(
            &buy_order(),
            &sell_order(),
            &[0x01, 0x02, 0x03],
            &[0x04, 0x05, 0x06],
            &[0x00, 0xff, 0x00],
        );

        let call = decode_atomic_match(&input).unwrap();
        assert_eq!(call.buy.maker, BUYER);
        assert_eq!(call.sell.maker, SELLER);
        assert_eq!(call.sell.target, NFT_CONTRACT);
        assert_eq!(call.buy.payment_token, Address::ZERO);
        assert_eq!(call.sell.maker_relayer_fee, U256::from(250u64));
        assert_eq!(call.sell.base_price, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(call.sell.side, Side::Sell);
        assert_eq!(call.buy.side, Side::Buy);
        assert_eq!(call.sell.sale_kind, SaleKind::FixedPrice);
        assert_eq!(call.sell.fee_method, FeeMethod::SplitFee);
        assert_eq!(call.calldata_buy, vec![0x01, 0x02, 0x03]);
        assert_eq!(call.calldata_sell, vec![0x04, 0x05, 0x06]);
        assert_eq!(call.replacement_pattern_buy, vec![0x00, 0xff, 0x00]);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let input = encode_atomic_match(&buy_order(), &sell_order(), &[], &[], &[]);
        assert!(decode_atomic_match(&input[..200]).is_err());
    }

    #[test]
    fn test_private_listing_detection() {
        let mut sell = sell_order();
        let input = encode_atomic_match(&buy_order(), &sell, &[], &[], &[]);
        assert!(!decode_atomic_match(&input).unwrap().is_private());

        sell.taker = BUYER;
        let input = encode_atomic_match(&buy_order(), &sell, &[], &[], &[]);
        assert!(decode_atomic_match(&input).unwrap().is_private());
    }

    #[test]
    fn test_effective_calldata_applies_replacement_pattern() {
        let call = AtomicMatchCall {
            buy: buy_order(),
            sell: sell_order(),
            calldata_buy: vec![0x11, 0x00, 0x33],
            calldata_sell: vec![0x00, 0x22, 0x00],
            replacement_pattern_buy: vec![0x00, 0xff, 0x00],
        };
        assert_eq!(call.effective_calldata(), vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_decode_rejects_bad_flags() {
        let mut input = encode_atomic_match(&buy_order(), &sell_order(), &[], &[], &[]);
        // buy side flag word (index FLAGS_BASE + 1) set to an unknown value
        let side_flag_at = SELECTOR + (FLAGS_BASE + 1) * WORD + WORD - 1;
        input[side_flag_at] = 9;
        assert_eq!(
            decode_atomic_match(&input),
            Err(DecodeError::BadFlag { field: "side", value: 9 })
        );
    }
}
