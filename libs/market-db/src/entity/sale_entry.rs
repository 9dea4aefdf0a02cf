use sqlx::{Executor, Postgres};

/// SaleEntry entity: one row per Transfer event observed inside a
/// marketplace transaction, keyed by `<txHash>-<logIndex>`. Links the
/// transferred token to its pending sale wrapper. Immutable once created.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SaleEntry {
    pub id: String,
    pub pending_sale_tx_hash: String,
    pub token_id: String,
    pub log_index: i32,
    pub block_number: i64,
}

/// Input for creating a new sale entry
#[derive(Debug, Clone)]
pub struct NewSaleEntry {
    pub id: String,
    pub pending_sale_tx_hash: String,
    pub token_id: String,
    pub log_index: i32,
    pub block_number: i64,
}

impl SaleEntry {
    /// Create a new sale entry record
    pub async fn create<'c, E>(
        entry: &NewSaleEntry,
        connection: E,
    ) -> Result<SaleEntry, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO sale_entries (id, pending_sale_tx_hash, token_id, log_index, block_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, SaleEntry>(query)
            .bind(&entry.id)
            .bind(&entry.pending_sale_tx_hash)
            .bind(&entry.token_id)
            .bind(entry.log_index)
            .bind(entry.block_number)
            .fetch_one(connection)
            .await
    }

    /// Find all entries for a transaction
    pub async fn find_by_tx_hash<'c, E>(
        tx_hash: &str,
        connection: E,
    ) -> Result<Vec<SaleEntry>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SaleEntry>(
            "SELECT * FROM sale_entries WHERE pending_sale_tx_hash = $1 ORDER BY log_index ASC",
        )
        .bind(tx_hash)
        .fetch_all(connection)
        .await
    }
}
