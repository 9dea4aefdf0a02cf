//! OrdersMatched event handler
//!
//! Settles the pending sale wrapper for a transaction: attributes the
//! total settlement price across the projects tallied by the Transfer
//! handler, bumps each project's running volume, and moves the wrapper to
//! its terminal state.

use std::str::FromStr;

use alloy::primitives::U256;
use market_db::entity::{pending_sale::PendingSale, project::Project};

use crate::events::orders_matched::OrdersMatchedEvent;
use crate::utils;

use super::{HandlerContext, HandlerResult};

/// Split a total price across projects proportionally by their occurrence
/// count in the transfer tally.
///
/// `share = total * count / len`, integer division truncating toward zero.
/// Residual wei from truncation is dropped, matching the exchange-side
/// accounting this mirrors. Order of first appearance is preserved.
pub fn allocate_project_shares(
    project_ids: &[String],
    total_price: &U256,
) -> Vec<(String, U256)> {
    if project_ids.is_empty() {
        return Vec::new();
    }

    let mut tally: Vec<(String, u64)> = Vec::new();
    for project_id in project_ids {
        match tally.iter_mut().find(|(id, _)| id == project_id) {
            Some((_, count)) => *count += 1,
            None => tally.push((project_id.clone(), 1)),
        }
    }

    let total_transfers = U256::from(project_ids.len() as u64);
    tally
        .into_iter()
        .map(|(project_id, count)| {
            let share = total_price.saturating_mul(U256::from(count)) / total_transfers;
            (project_id, share)
        })
        .collect()
}

/// Process an OrdersMatched event
///
/// 1. Look up the wrapper by transaction hash; unknown hashes are not our
///    sales and are silently ignored
/// 2. Already-settled wrappers are left untouched (terminal state)
/// 3. Allocate the price across tallied projects, add to volume totals
/// 4. Record the price, null the tally, flip the wrapper to settled
pub async fn handle(ctx: &HandlerContext, event: &OrdersMatchedEvent) -> HandlerResult<()> {
    let wrapper = match PendingSale::find_by_tx_hash(&event.tx_hash, &ctx.db_pool).await? {
        Some(w) => w,
        None => {
            // Settlement for a transaction we never saw a transfer in,
            // steady-state for non-domain sales
            return Ok(());
        }
    };

    if wrapper.is_settled() {
        println!("Repeat settlement for {}, ignoring", event.tx_hash);
        return Ok(());
    }

    let total_price = U256::from_str(&event.price_wei).unwrap_or_default();

    let project_ids = wrapper.associated_project_ids.unwrap_or_default();
    for (project_id, share) in allocate_project_shares(&project_ids, &total_price) {
        Project::add_sale_volume(&project_id, &utils::u256_to_bigdecimal(&share), &ctx.db_pool)
            .await?;
    }

    PendingSale::settle(
        &event.tx_hash,
        &utils::u256_to_bigdecimal(&total_price),
        &ctx.db_pool,
    )
    .await?;

    println!(
        "Settled {} ({} wei across {} transfers, bundle={})",
        event.tx_hash,
        event.price_wei,
        project_ids.len(),
        wrapper.is_bundle
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_shares_split_proportionally() {
        // 3 transfers from project A, 1 from project B, 400 wei total
        let shares = allocate_project_shares(&ids(&["A", "A", "A", "B"]), &U256::from(400u64));

        assert_eq!(
            shares,
            vec![
                ("A".to_string(), U256::from(300u64)),
                ("B".to_string(), U256::from(100u64)),
            ]
        );
    }

    #[test]
    fn test_truncation_drops_residual_wei() {
        // 2/1 split of 100 wei: 66 + 33 = 99, 1 wei dropped
        let shares = allocate_project_shares(&ids(&["A", "A", "B"]), &U256::from(100u64));

        assert_eq!(
            shares,
            vec![
                ("A".to_string(), U256::from(66u64)),
                ("B".to_string(), U256::from(33u64)),
            ]
        );
    }

    #[test]
    fn test_share_conservation_bound() {
        // allocated total never exceeds the price, and the shortfall stays
        // below one wei per unique project
        let cases: &[(&[&str], u64)] = &[
            (&["A"], 1),
            (&["A", "B"], 999),
            (&["A", "A", "B"], 100),
            (&["A", "B", "C", "A", "C", "C", "D"], 12_345),
        ];

        for (projects, price) in cases {
            let project_ids = ids(projects);
            let total = U256::from(*price);
            let shares = allocate_project_shares(&project_ids, &total);

            let allocated: U256 = shares.iter().fold(U256::ZERO, |acc, (_, s)| acc + s);
            assert!(allocated <= total);

            let unique = shares.len() as u64;
            assert!(total - allocated < U256::from(unique));
        }
    }

    #[test]
    fn test_even_split_conserves_exactly() {
        let shares = allocate_project_shares(&ids(&["A", "A", "B", "B"]), &U256::from(400u64));
        let allocated: U256 = shares.iter().fold(U256::ZERO, |acc, (_, s)| acc + s);
        assert_eq!(allocated, U256::from(400u64));
    }

    #[test]
    fn test_single_project_takes_the_whole_price() {
        let shares = allocate_project_shares(&ids(&["A", "A"]), &U256::from(777u64));
        assert_eq!(shares, vec![("A".to_string(), U256::from(777u64))]);
    }

    #[test]
    fn test_empty_tally_allocates_nothing() {
        assert!(allocate_project_shares(&[], &U256::from(400u64)).is_empty());
    }

    #[test]
    fn test_duplicates_preserve_first_appearance_order() {
        let shares = allocate_project_shares(&ids(&["B", "A", "B"]), &U256::from(300u64));
        assert_eq!(shares[0].0, "B");
        assert_eq!(shares[0].1, U256::from(200u64));
        assert_eq!(shares[1].0, "A");
        assert_eq!(shares[1].1, U256::from(100u64));
    }
}
