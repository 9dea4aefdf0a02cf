//! Event handlers for the marketplace sale indexer
//!
//! Handlers consume decoded events/calls and persist the reconstructed
//! sale graph, including bundle detection, price attribution and the
//! per-project volume totals.

pub mod atomic_match;
pub mod orders_matched;
pub mod transfer;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Context passed to handlers containing database pool and config
pub struct HandlerContext {
    pub db_pool: Pool<Postgres>,
    pub exchange_address: String,
    pub atomicizer_address: String,
    pub exchange_tag: String,
}

impl HandlerContext {
    pub fn new(
        db_pool: Pool<Postgres>,
        exchange_address: String,
        atomicizer_address: String,
        exchange_tag: String,
    ) -> Self {
        Self {
            db_pool,
            exchange_address,
            atomicizer_address,
            exchange_tag,
        }
    }

    /// Check if address is the tracked exchange deployment
    pub fn is_exchange(&self, address: &str) -> bool {
        address.to_lowercase() == self.exchange_address.to_lowercase()
    }

    /// Check if address is the exchange's bundle atomicizer
    pub fn is_atomicizer(&self, address: &str) -> bool {
        address.to_lowercase() == self.atomicizer_address.to_lowercase()
    }
}

/// Result type for handlers
pub type HandlerResult<T> = Result<T, AppError>;
