//! Settlement price calculation.
//!
//! Mirrors the exchange contract's own fixed-point arithmetic: all math is
//! U256 with truncating integer division, because the computed value has to
//! agree with what settled on chain to the wei.

use alloy::primitives::U256;

use super::order::ExchangeOrder;
use super::DecodeError;

/// Fee denominator used by the exchange (fees are expressed in basis points)
pub const INVERSE_BASIS_POINT: u64 = 10_000;

/// Which side of the match an order sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_flag(value: u8) -> Result<Side, DecodeError> {
        match value {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            _ => Err(DecodeError::BadFlag { field: "side", value }),
        }
    }
}

/// Pricing schedule of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleKind {
    FixedPrice,
    DutchAuction,
}

impl SaleKind {
    pub fn from_flag(value: u8) -> Result<SaleKind, DecodeError> {
        match value {
            0 => Ok(SaleKind::FixedPrice),
            1 => Ok(SaleKind::DutchAuction),
            _ => Err(DecodeError::BadFlag { field: "sale kind", value }),
        }
    }
}

/// How the exchange collects its fees for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeMethod {
    /// Fees are deducted from the transfer amount itself
    ProtocolFee,
    /// Fees are charged on top; the nominal price is what changes hands
    SplitFee,
}

impl FeeMethod {
    pub fn from_flag(value: u8) -> Result<FeeMethod, DecodeError> {
        match value {
            0 => Ok(FeeMethod::ProtocolFee),
            1 => Ok(FeeMethod::SplitFee),
            _ => Err(DecodeError::BadFlag { field: "fee method", value }),
        }
    }
}

/// Current sale price of one order at `now`.
///
/// Fixed-price orders are just their base price. Dutch auctions move
/// linearly from `base_price` toward `base_price ± extra` over the listing
/// window, elapsed time clamped to the window, direction set by the side
/// (sell orders descend, buy orders ascend).
pub fn final_sale_price(
    side: Side,
    sale_kind: SaleKind,
    base_price: U256,
    extra: U256,
    listing_time: U256,
    expiration_time: U256,
    now: U256,
) -> U256 {
    match sale_kind {
        SaleKind::FixedPrice => base_price,
        SaleKind::DutchAuction => {
            if expiration_time <= listing_time {
                // degenerate window, treat as fixed
                return base_price;
            }

            let span = expiration_time - listing_time;
            let elapsed = now.saturating_sub(listing_time).min(span);
            let diff = extra.saturating_mul(elapsed) / span;

            match side {
                Side::Sell => base_price.saturating_sub(diff),
                Side::Buy => base_price.saturating_add(diff),
            }
        }
    }
}

/// Wei amount actually settled for `order` at `now`, net of fees.
///
/// Under the split-fee method the nominal price stands (fees are paid on
/// top by the counterparty). Under the deduct-from-price method the
/// relevant relayer fee comes out of the price itself, once: the taker fee
/// for a sell order, the maker fee for a buy order.
pub fn settlement_price(order: &ExchangeOrder, now: U256) -> U256 {
    let price = final_sale_price(
        order.side,
        order.sale_kind,
        order.base_price,
        order.extra,
        order.listing_time,
        order.expiration_time,
        now,
    );

    match order.fee_method {
        FeeMethod::SplitFee => price,
        FeeMethod::ProtocolFee => {
            let fee = match order.side {
                Side::Sell => order.taker_relayer_fee,
                Side::Buy => order.maker_relayer_fee,
            };

            price.saturating_sub(price.saturating_mul(fee) / U256::from(INVERSE_BASIS_POINT))
        }
    }
}
