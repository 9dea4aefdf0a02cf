//! Decoders for the proxied transfer calldata carried inside a match call.
//!
//! Two shapes appear in practice: a plain `transferFrom(from, to, tokenId)`
//! call against the NFT contract itself, and an "atomicized" call that
//! bundles N independent sub-calls through the exchange's atomicizer
//! contract. Both are decoded by hand from the raw words; the buffers come
//! out of the order merge, not from a log, so there is no ABI context to
//! lean on.

use alloy::primitives::U256;

use super::{DecodeError, TokenTransferRef};
use crate::utils;

/// EVM word size
pub const WORD: usize = 32;
/// 4-byte function selector
const SELECTOR: usize = 4;
/// transferFrom(address,address,uint256): the token id is the third
/// argument word
const TRANSFER_TOKEN_ID_OFFSET: usize = SELECTOR + 2 * WORD;
/// Minimum length of a well-formed transferFrom calldata
const TRANSFER_CALLDATA_LEN: usize = SELECTOR + 3 * WORD;

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], DecodeError> {
    let end = offset.checked_add(WORD).ok_or(DecodeError::LengthOverflow)?;
    data.get(offset..end).ok_or(DecodeError::TooShort {
        need: end,
        have: data.len(),
    })
}

fn usize_word_at(data: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let word = U256::from_be_slice(word_at(data, offset)?);
    usize::try_from(word).map_err(|_| DecodeError::LengthOverflow)
}

/// Token id of a single-asset transfer call
pub fn decode_transfer_token_id(data: &[u8]) -> Result<U256, DecodeError> {
    if data.len() < TRANSFER_CALLDATA_LEN {
        return Err(DecodeError::TooShort {
            need: TRANSFER_CALLDATA_LEN,
            have: data.len(),
        });
    }

    Ok(U256::from_be_slice(word_at(data, TRANSFER_TOKEN_ID_OFFSET)?))
}

/// Decode an atomicized bundle call:
/// `atomicize(address[] targets, uint256[] values, uint256[] lengths, bytes calldatas)`
///
/// The four head words after the selector hold offsets (relative to the
/// argument region) of the dynamic arguments. Targets, per-call lengths and
/// the concatenated calldata blob are walked in lock-step, one sub-call at
/// a time.
///
/// A malformed outer frame is an error. A sub-call whose own calldata does
/// not yield a token id only fails that item, since bundles routinely mix
/// domain and non-domain assets, so the caller keeps the good items.
pub fn decode_atomicized(
    data: &[u8],
) -> Result<Vec<Result<TokenTransferRef, DecodeError>>, DecodeError> {
    if data.len() < SELECTOR + 4 * WORD {
        return Err(DecodeError::TooShort {
            need: SELECTOR + 4 * WORD,
            have: data.len(),
        });
    }

    let args = &data[SELECTOR..];
    let targets_offset = usize_word_at(args, 0)?;
    let lengths_offset = usize_word_at(args, 2 * WORD)?;
    let calldatas_offset = usize_word_at(args, 3 * WORD)?;

    let count = usize_word_at(args, targets_offset)?;
    let lengths_count = usize_word_at(args, lengths_offset)?;
    if lengths_count != count {
        return Err(DecodeError::BadFrame("targets/lengths arity mismatch"));
    }

    let blob_len = usize_word_at(args, calldatas_offset)?;
    let blob_start = calldatas_offset
        .checked_add(WORD)
        .ok_or(DecodeError::LengthOverflow)?;
    let blob_end = blob_start
        .checked_add(blob_len)
        .ok_or(DecodeError::LengthOverflow)?;
    let blob = args.get(blob_start..blob_end).ok_or(DecodeError::TooShort {
        need: blob_end,
        have: args.len(),
    })?;

    let mut transfers = Vec::with_capacity(count);
    let mut cursor = 0usize;
    for index in 0..count {
        let target = utils::word_to_address(word_at(args, targets_offset + WORD * (1 + index))?);
        let length = usize_word_at(args, lengths_offset + WORD * (1 + index))?;

        let end = cursor.checked_add(length).ok_or(DecodeError::LengthOverflow)?;
        let sub_calldata = blob.get(cursor..end).ok_or(DecodeError::BadFrame(
            "sub-call length overruns calldata blob",
        ))?;
        cursor = end;

        transfers.push(
            decode_transfer_token_id(sub_calldata)
                .map(|token_id| TokenTransferRef { contract: target, token_id }),
        );
    }

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Address};

    fn uint_word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes::<32>()
    }

    fn address_word(value: Address) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(value.as_slice());
        word
    }

    fn transfer_calldata(from: Address, to: Address, token_id: u64) -> Vec<u8> {
        let mut data = vec![0x23, 0xb8, 0x72, 0xdd]; // transferFrom selector
        data.extend_from_slice(&address_word(from));
        data.extend_from_slice(&address_word(to));
        data.extend_from_slice(&uint_word(token_id));
        data
    }

    /// atomicize(address[],uint256[],uint256[],bytes) with one sub-call
    /// calldata blob per target
    fn atomicized_calldata(sub_calls: &[(Address, Vec<u8>)]) -> Vec<u8> {
        let n = sub_calls.len();
        let mut data = vec![0x68, 0xf0, 0xbc, 0xaa]; // atomicize selector

        // head: offsets of the four dynamic args, relative to the args region
        let targets_offset = 4 * WORD;
        let values_offset = targets_offset + WORD * (1 + n);
        let lengths_offset = values_offset + WORD * (1 + n);
        let calldatas_offset = lengths_offset + WORD * (1 + n);
        for offset in [targets_offset, values_offset, lengths_offset, calldatas_offset] {
            data.extend_from_slice(&uint_word(offset as u64));
        }

        // targets
        data.extend_from_slice(&uint_word(n as u64));
        for (target, _) in sub_calls {
            data.extend_from_slice(&address_word(*target));
        }
        // values (all zero)
        data.extend_from_slice(&uint_word(n as u64));
        for _ in sub_calls {
            data.extend_from_slice(&uint_word(0));
        }
        // lengths
        data.extend_from_slice(&uint_word(n as u64));
        for (_, calldata) in sub_calls {
            data.extend_from_slice(&uint_word(calldata.len() as u64));
        }
        // concatenated blobs
        let blob: Vec<u8> = sub_calls.iter().flat_map(|(_, c)| c.clone()).collect();
        data.extend_from_slice(&uint_word(blob.len() as u64));
        data.extend_from_slice(&blob);

        data
    }

    const NFT_A: Address = address!("1111111111111111111111111111111111111111");
    const NFT_B: Address = address!("2222222222222222222222222222222222222222");
    const SELLER: Address = address!("00000000000000000000000000000000000000aa");
    const BUYER: Address = address!("00000000000000000000000000000000000000bb");

    #[test]
    fn test_transfer_token_id_at_fixed_offset() {
        let calldata = transfer_calldata(SELLER, BUYER, 42);
        assert_eq!(decode_transfer_token_id(&calldata), Ok(U256::from(42)));
    }

    #[test]
    fn test_transfer_too_short_is_an_error() {
        let calldata = transfer_calldata(SELLER, BUYER, 42);
        let result = decode_transfer_token_id(&calldata[..80]);
        assert_eq!(
            result,
            Err(DecodeError::TooShort { need: 100, have: 80 })
        );
    }

    #[test]
    fn test_atomicized_walks_all_sub_calls_in_order() {
        let calldata = atomicized_calldata(&[
            (NFT_A, transfer_calldata(SELLER, BUYER, 7)),
            (NFT_B, transfer_calldata(SELLER, BUYER, 9)),
            (NFT_A, transfer_calldata(SELLER, BUYER, 8)),
        ]);

        let decoded: Vec<_> = decode_atomicized(&calldata)
            .unwrap()
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(
            decoded,
            vec![
                TokenTransferRef { contract: NFT_A, token_id: U256::from(7) },
                TokenTransferRef { contract: NFT_B, token_id: U256::from(9) },
                TokenTransferRef { contract: NFT_A, token_id: U256::from(8) },
            ]
        );
    }

    #[test]
    fn test_atomicized_bad_sub_call_does_not_abort_batch() {
        // middle sub-call is a 8-byte stub, too short to carry a token id
        let calldata = atomicized_calldata(&[
            (NFT_A, transfer_calldata(SELLER, BUYER, 7)),
            (NFT_B, vec![0u8; 8]),
            (NFT_A, transfer_calldata(SELLER, BUYER, 8)),
        ]);

        let decoded = decode_atomicized(&calldata).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].is_ok());
        assert!(decoded[1].is_err());
        assert_eq!(
            decoded[2],
            Ok(TokenTransferRef { contract: NFT_A, token_id: U256::from(8) })
        );
    }

    #[test]
    fn test_atomicized_decode_is_idempotent() {
        let calldata = atomicized_calldata(&[
            (NFT_A, transfer_calldata(SELLER, BUYER, 7)),
            (NFT_B, transfer_calldata(SELLER, BUYER, 9)),
        ]);

        assert_eq!(decode_atomicized(&calldata), decode_atomicized(&calldata));
    }

    #[test]
    fn test_atomicized_truncated_frame_is_an_error() {
        let calldata = atomicized_calldata(&[(NFT_A, transfer_calldata(SELLER, BUYER, 7))]);

        // cut into the calldata blob
        let truncated = &calldata[..calldata.len() - 10];
        assert!(decode_atomicized(truncated).is_err());

        // not even a full head
        assert!(decode_atomicized(&calldata[..64]).is_err());
    }

    #[test]
    fn test_atomicized_arity_mismatch_is_an_error() {
        let mut calldata = atomicized_calldata(&[
            (NFT_A, transfer_calldata(SELLER, BUYER, 7)),
            (NFT_B, transfer_calldata(SELLER, BUYER, 9)),
        ]);

        // overwrite the lengths array count (args offset 4*32 + 2*(1+2)*32)
        let lengths_count_at = 4 + 4 * WORD + 2 * WORD * 3;
        calldata[lengths_count_at..lengths_count_at + WORD].copy_from_slice(&uint_word(1));

        assert_eq!(
            decode_atomicized(&calldata),
            Err(DecodeError::BadFrame("targets/lengths arity mismatch"))
        );
    }
}
