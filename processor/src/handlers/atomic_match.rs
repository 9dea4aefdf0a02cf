//! Atomic match call handler
//!
//! Reconstructs the sale behind an `atomicMatch_` call and projects it
//! into Sale / Payment / lookup rows:
//! 1. Merge the order calldata and decode which tokens changed hands
//! 2. Keep only tokens the indexer tracks
//! 3. Recompute the settlement price from the sell order's fee fields
//! 4. Persist the sale graph in one transaction, bumping every involved
//!    token's sale counter alongside the Sale insert

use alloy::primitives::{Address, U256};
use market_db::entity::{
    payment::{NewPayment, Payment, PaymentType},
    sale::{NewSale, Sale, SaleType},
    sale_lookup_table::{NewSaleLookupTable, SaleLookupTable},
    token::Token,
};

use crate::events::atomic_match::AtomicMatchEvent;
use crate::exchange::order::{AtomicMatchCall, ExchangeOrder};
use crate::exchange::{calldata, pricing, TokenTransferRef};
use crate::{ids, utils};

use super::{HandlerContext, HandlerResult};

/// Decode the tokens moved by a match call.
///
/// The sale target routes the decode: the atomicizer means the merged
/// calldata is a bundle of sub-calls, anything else is a single
/// `transferFrom` against the target contract itself. Bundle sub-items
/// that fail to decode are skipped; the good items survive. A calldata
/// that decodes to nothing means "not a sale we can attribute".
pub fn decode_matched_transfers(call: &AtomicMatchCall, bundled: bool) -> Vec<TokenTransferRef> {
    let merged = call.effective_calldata();

    if bundled {
        match calldata::decode_atomicized(&merged) {
            Ok(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Ok(transfer) => Some(transfer),
                    Err(e) => {
                        eprintln!("Skipping bundle item: {}", e);
                        None
                    }
                })
                .collect(),
            Err(e) => {
                eprintln!("Bundle decode failed: {}", e);
                Vec::new()
            }
        }
    } else {
        match calldata::decode_transfer_token_id(&merged) {
            Ok(token_id) => vec![TokenTransferRef {
                contract: call.sell.target,
                token_id,
            }],
            Err(e) => {
                eprintln!("Transfer decode failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// The order whose pricing terms settle the match: the side carrying the
/// fee recipient is the maker order, and the exchange prices the match
/// from the maker's schedule
pub fn pricing_order(call: &AtomicMatchCall) -> &ExchangeOrder {
    if call.sell.fee_recipient != Address::ZERO {
        &call.sell
    } else {
        &call.buy
    }
}

/// Process an atomic match call
///
/// Returns the recorded Sale, or None when the call did not touch any
/// tracked token (the store is left untouched in that case).
pub async fn handle(
    ctx: &HandlerContext,
    event: &AtomicMatchEvent,
) -> HandlerResult<Option<Sale>> {
    let call = &event.call;
    let sale_target = utils::address_to_hex(&call.sell.target);
    let bundled = ctx.is_atomicizer(&sale_target);

    let transfers = decode_matched_transfers(call, bundled);
    if transfers.is_empty() {
        return Ok(None);
    }

    // Existence filter: keep transfers whose token the indexer tracks
    let mut tokens: Vec<Token> = Vec::new();
    for transfer in &transfers {
        let token_id = ids::token_id(
            &utils::address_to_hex(&transfer.contract),
            &transfer.token_id.to_string(),
        );
        if let Some(token) = Token::find_by_id(&token_id, &ctx.db_pool).await? {
            tokens.push(token);
        }
    }
    if tokens.is_empty() {
        println!("No tracked tokens in match {}", event.tx_hash);
        return Ok(None);
    }

    let now = U256::from(event.block_timestamp.timestamp().max(0) as u64);
    let price = pricing::settlement_price(pricing_order(call), now);

    let sale_type = if bundled { SaleType::Bundle } else { SaleType::Single };
    let summary_tokens_sold = tokens
        .iter()
        .map(|t| t.id.as_str())
        .collect::<Vec<_>>()
        .join(":");

    let payment_type = if call.buy.payment_token == Address::ZERO {
        PaymentType::Native
    } else {
        PaymentType::Erc20
    };

    // One transaction for the whole projection: a Sale must never land
    // without its counter bumps
    let mut tx = ctx.db_pool.begin().await?;

    let sale_counter = Token::increment_next_sale_id(&tokens[0].id, &mut *tx).await?;
    for token in &tokens[1..] {
        Token::increment_next_sale_id(&token.id, &mut *tx).await?;
    }

    let sale_id = ids::sale_id(&tokens[0].id, sale_counter);
    let sale = Sale::create(
        &NewSale {
            id: sale_id.clone(),
            tx_hash: event.tx_hash.clone(),
            exchange_tag: ctx.exchange_tag.clone(),
            sale_type: sale_type.as_str().to_string(),
            block_number: event.block_number,
            block_timestamp: event.block_timestamp,
            buyer: utils::address_to_hex(&call.buy.maker),
            seller: utils::address_to_hex(&call.sell.maker),
            is_private: call.is_private(),
            summary_tokens_sold,
        },
        &mut *tx,
    )
    .await?;

    Payment::create(
        &NewPayment {
            id: ids::payment_id(&sale_id, 0),
            sale_id: sale_id.clone(),
            payment_type: payment_type.as_str().to_string(),
            payment_token: utils::address_to_hex(&call.buy.payment_token),
            price: utils::u256_to_bigdecimal(&price),
            recipient: utils::address_to_hex(&call.sell.maker),
        },
        &mut *tx,
    )
    .await?;

    for token in &tokens {
        SaleLookupTable::create(
            &NewSaleLookupTable {
                id: ids::sale_lookup_id(&token.project_id, &token.id, &sale_id),
                project_id: token.project_id.clone(),
                token_id: token.id.clone(),
                sale_id: sale_id.clone(),
                block_number: event.block_number,
            },
            &mut *tx,
        )
        .await?;
    }

    tx.commit().await?;

    println!(
        "Recorded {} sale {}: {} token(s), {} wei",
        sale.sale_type,
        sale.id,
        tokens.len(),
        price
    );

    Ok(Some(sale))
}
