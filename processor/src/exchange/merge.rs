//! Order calldata merge.
//!
//! The exchange validates a match by merging the buy order's calldata
//! template with the sell order's concrete calldata, byte-masked by the
//! buy order's replacement pattern. Downstream decoding runs on the merged
//! buffer, so this must produce byte-identical output to the on-chain
//! merge.

/// For every byte position, take `source[i]` where `mask[i]` is non-zero,
/// `target[i]` otherwise. Any length mismatch (legacy orders ship
/// zero-length masks) returns the target unchanged.
pub fn guarded_array_replace(target: &[u8], source: &[u8], mask: &[u8]) -> Vec<u8> {
    if target.len() != source.len() || target.len() != mask.len() {
        return target.to_vec();
    }

    target
        .iter()
        .zip(source.iter())
        .zip(mask.iter())
        .map(|((&t, &s), &m)| if m != 0x00 { s } else { t })
        .collect()
}
