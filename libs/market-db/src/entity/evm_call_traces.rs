use alloy::primitives::Address;
use sqlx::{types::chrono, Executor, Postgres};

/// Decoded-call trace queued for processing.
///
/// Same delivery contract as `evm_logs`: the external runtime inserts one
/// row per traced contract call (with its full input bytes), the processor
/// drains and deletes.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct EvmCallTraces {
    pub id: i64,
    /// Contract the call was sent to
    pub to_address: Vec<u8>,
    /// Full call input, selector included
    pub input: Vec<u8>,
    pub block_number: i64,
    pub block_timestamp: chrono::DateTime<chrono::Utc>,
    pub transaction_hash: Vec<u8>,
}

impl EvmCallTraces {
    /// Call target as a typed address
    pub fn target(&self) -> Option<Address> {
        (self.to_address.len() == 20).then(|| Address::from_slice(&self.to_address))
    }

    /// Fetch the oldest unprocessed call traces, in delivery order
    pub async fn find_all<'c, E>(
        limit: i32,
        connection: E,
    ) -> Result<Vec<EvmCallTraces>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, EvmCallTraces>(
            "SELECT * FROM evm_call_traces ORDER BY block_number ASC, id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(connection)
        .await
    }

    /// Count unprocessed call traces, None if the queue is empty
    pub async fn count<'c, E>(connection: E) -> Result<Option<i64>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM evm_call_traces")
            .fetch_one(connection)
            .await?;

        Ok((row.0 > 0).then_some(row.0))
    }

    /// Delete a processed call trace from the queue
    pub async fn delete<'c, E>(id: i64, connection: E) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query("DELETE FROM evm_call_traces WHERE id = $1")
            .bind(id)
            .execute(connection)
            .await?;

        Ok(())
    }
}
