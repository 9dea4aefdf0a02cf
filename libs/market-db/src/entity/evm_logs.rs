use alloy::primitives::Address;
use sqlx::{types::chrono, Executor, Postgres};

/// Raw EVM log queued for processing.
///
/// Rows are written by the external indexing runtime in on-chain order
/// (ascending block, then log index) and drained by the processor, which
/// deletes each row once it has been handled.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct EvmLogs {
    pub id: i64,
    /// Contract that emitted the log
    pub address: Vec<u8>,
    /// topics[0], the event signature hash
    pub event_signature: Vec<u8>,
    /// All topics, including the signature at index 0
    pub topics: Vec<Vec<u8>>,
    /// Non-indexed event data
    pub data: Vec<u8>,
    pub block_number: i64,
    pub block_timestamp: chrono::DateTime<chrono::Utc>,
    pub transaction_hash: Vec<u8>,
    /// Recipient of the enclosing transaction (None for contract creations)
    pub transaction_to: Option<Vec<u8>>,
    pub log_index: i32,
}

impl EvmLogs {
    /// Emitting contract as a typed address
    pub fn emitter(&self) -> Option<Address> {
        (self.address.len() == 20).then(|| Address::from_slice(&self.address))
    }

    /// Fetch the oldest unprocessed logs, in delivery order
    pub async fn find_all<'c, E>(limit: i32, connection: E) -> Result<Vec<EvmLogs>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, EvmLogs>(
            "SELECT * FROM evm_logs ORDER BY block_number ASC, log_index ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(connection)
        .await
    }

    /// Count unprocessed logs, None if the queue is empty
    pub async fn count<'c, E>(connection: E) -> Result<Option<i64>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM evm_logs")
            .fetch_one(connection)
            .await?;

        Ok((row.0 > 0).then_some(row.0))
    }

    /// Delete a processed log from the queue
    pub async fn delete<'c, E>(id: i64, connection: E) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query("DELETE FROM evm_logs WHERE id = $1")
            .bind(id)
            .execute(connection)
            .await?;

        Ok(())
    }
}
