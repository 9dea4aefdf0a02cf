//! Deterministic composite keys for marketplace entities.
//!
//! Every persisted record is addressed by a string key derived from chain
//! coordinates, so re-deriving a key from the same inputs always lands on
//! the same row.

/// Composite token id: `<contract>-<tokenNumber>`, contract lowercased
pub fn token_id(contract_address: &str, token_number: &str) -> String {
    format!("{}-{}", contract_address.to_lowercase(), token_number)
}

/// Sale entry id: `<txHash>-<logIndex>`
pub fn sale_entry_id(tx_hash: &str, log_index: i32) -> String {
    format!("{}-{}", tx_hash.to_lowercase(), log_index)
}

/// Sale id: `<tokenId>-<saleCounter>`
pub fn sale_id(token_id: &str, sale_counter: i64) -> String {
    format!("{}-{}", token_id, sale_counter)
}

/// Payment id: `<saleId>-<index>` (index 0 today, room for multi-payment)
pub fn payment_id(sale_id: &str, index: u32) -> String {
    format!("{}-{}", sale_id, index)
}

/// Lookup row id: `<projectId>::<tokenId>::<saleId>`
pub fn sale_lookup_id(project_id: &str, token_id: &str, sale_id: &str) -> String {
    format!("{}::{}::{}", project_id, token_id, sale_id)
}
