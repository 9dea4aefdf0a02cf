//! Transfer event handler
//!
//! Handles NFT Transfer events to feed the per-transaction sale wrapper:
//! - First transfer inside an exchange transaction opens a pending wrapper
//! - A second transfer before settlement flips the wrapper to a bundle
//! - Tracked tokens add their project id to the wrapper's transfer tally
//!   and get a SaleEntry row; untracked tokens only leave the wrapper

use market_db::entity::{
    pending_sale::{NewPendingSale, PendingSale},
    sale_entry::{NewSaleEntry, SaleEntry},
    token::Token,
};

use crate::events::transfer::TransferEvent;
use crate::ids;

use super::{HandlerContext, HandlerResult};

/// Process a Transfer event
///
/// 1. Ignore transfers outside exchange transactions
/// 2. Open the pending sale wrapper, or mark it a bundle on a repeat
/// 3. Look up the token; untracked tokens stop here
/// 4. Tally the token's project id on the wrapper
/// 5. Record a SaleEntry and the token's new owner
pub async fn handle(ctx: &HandlerContext, event: &TransferEvent) -> HandlerResult<()> {
    // Only transactions sent to the exchange can be sales
    let transaction_to = match &event.transaction_to {
        Some(to) => to,
        None => return Ok(()),
    };
    if !ctx.is_exchange(transaction_to) {
        return Ok(());
    }

    match PendingSale::find_by_tx_hash(&event.tx_hash, &ctx.db_pool).await? {
        Some(wrapper) => {
            if wrapper.is_settled() {
                // transfers trail a settled wrapper only on replays
                println!(
                    "Transfer after settlement for {}, skipping",
                    event.tx_hash
                );
                return Ok(());
            }

            // second transfer in the same transaction: it's a bundle
            if !wrapper.is_bundle {
                PendingSale::mark_bundle(&event.tx_hash, &ctx.db_pool).await?;
            }
        }
        None => {
            let wrapper = NewPendingSale {
                tx_hash: event.tx_hash.clone(),
                timestamp: event.block_timestamp,
                from_address: event.from.clone(),
                to_address: event.to.clone(),
            };

            if let Err(e) = PendingSale::create(&wrapper, &ctx.db_pool).await {
                // Might be duplicate (idempotent)
                println!("Pending sale create result: {}", e);
            }
        }
    }

    // Check if this token is being tracked
    let token_id = ids::token_id(&event.token_contract, &event.token_number);
    let token = match Token::find_by_id(&token_id, &ctx.db_pool).await? {
        Some(t) => t,
        None => {
            // Token not in our database: the wrapper exists, but this
            // transfer contributes nothing to price attribution
            return Ok(());
        }
    };

    PendingSale::append_project(&event.tx_hash, &token.project_id, &ctx.db_pool).await?;

    let entry = NewSaleEntry {
        id: ids::sale_entry_id(&event.tx_hash, event.log_index),
        pending_sale_tx_hash: event.tx_hash.clone(),
        token_id: token.id.clone(),
        log_index: event.log_index,
        block_number: event.block_number,
    };

    if let Err(e) = SaleEntry::create(&entry, &ctx.db_pool).await {
        // Might be duplicate (idempotent)
        println!("Sale entry create result: {}", e);
    }

    if let Err(e) = Token::update_owner(&token.id, &event.to, &ctx.db_pool).await {
        eprintln!("Failed to update token owner: {}", e);
    }

    println!(
        "Processed Transfer: {} -> {} ({} in tx {})",
        &event.from[..10],
        &event.to[..10],
        token.id,
        event.tx_hash
    );

    Ok(())
}
