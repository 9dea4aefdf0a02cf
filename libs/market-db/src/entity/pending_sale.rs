use sqlx::{
    types::{chrono, BigDecimal},
    Executor, Postgres,
};

/// Status of a pending sale wrapper. `Settled` is terminal: a second
/// settlement event for the same transaction hash is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSaleStatus {
    Pending,
    Settled,
}

impl PendingSaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingSaleStatus::Pending => "pending",
            PendingSaleStatus::Settled => "settled",
        }
    }
}

/// PendingSale entity: the per-transaction sale wrapper.
///
/// One row per marketplace transaction, keyed by transaction hash. Created
/// on the first Transfer event observed for a transaction sent to the
/// exchange, flipped to a bundle when a second Transfer arrives, and
/// finalized when the exchange's settlement event for the same hash lands.
/// Rows are never deleted; `associated_project_ids` is nulled out at
/// settlement so the persisted row stays small.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PendingSale {
    pub tx_hash: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub from_address: String,
    pub to_address: String,
    pub is_bundle: bool,
    /// "pending" or "settled", see [`PendingSaleStatus`]
    pub status: String,
    /// One entry per tracked transfer in the transaction; duplicates are
    /// meaningful (used for proportional bundle pricing). NULL once settled.
    pub associated_project_ids: Option<Vec<String>>,
    /// Total settlement price in wei, set when the wrapper settles
    pub price_in_wei: Option<BigDecimal>,
}

/// Input for creating a new pending sale wrapper
#[derive(Debug, Clone)]
pub struct NewPendingSale {
    pub tx_hash: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub from_address: String,
    pub to_address: String,
}

impl PendingSale {
    /// Create a new wrapper in the pending state
    pub async fn create<'c, E>(
        pending: &NewPendingSale,
        connection: E,
    ) -> Result<PendingSale, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO pending_sales (tx_hash, timestamp, from_address, to_address, is_bundle, status)
            VALUES ($1, $2, $3, $4, FALSE, 'pending')
            ON CONFLICT (tx_hash) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, PendingSale>(query)
            .bind(&pending.tx_hash)
            .bind(pending.timestamp)
            .bind(&pending.from_address)
            .bind(&pending.to_address)
            .fetch_one(connection)
            .await
    }

    /// Find wrapper by transaction hash
    pub async fn find_by_tx_hash<'c, E>(
        tx_hash: &str,
        connection: E,
    ) -> Result<Option<PendingSale>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, PendingSale>("SELECT * FROM pending_sales WHERE tx_hash = $1")
            .bind(tx_hash)
            .fetch_optional(connection)
            .await
    }

    /// Mark the wrapper as a bundle (second transfer seen before settlement)
    pub async fn mark_bundle<'c, E>(tx_hash: &str, connection: E) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query("UPDATE pending_sales SET is_bundle = TRUE WHERE tx_hash = $1")
            .bind(tx_hash)
            .execute(connection)
            .await?;

        Ok(())
    }

    /// Append a project id to the transfer tally. Duplicates are expected;
    /// they carry the per-project occurrence count for bundle pricing.
    pub async fn append_project<'c, E>(
        tx_hash: &str,
        project_id: &str,
        connection: E,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE pending_sales SET
                associated_project_ids = array_append(COALESCE(associated_project_ids, '{}'), $2)
            WHERE tx_hash = $1
            "#,
        )
        .bind(tx_hash)
        .bind(project_id)
        .execute(connection)
        .await?;

        Ok(())
    }

    /// Finalize the wrapper: record the settlement price, drop the transfer
    /// tally and move to the terminal state
    pub async fn settle<'c, E>(
        tx_hash: &str,
        price_in_wei: &BigDecimal,
        connection: E,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE pending_sales SET
                price_in_wei = $2,
                associated_project_ids = NULL,
                status = 'settled'
            WHERE tx_hash = $1
            "#,
        )
        .bind(tx_hash)
        .bind(price_in_wei)
        .execute(connection)
        .await?;

        Ok(())
    }

    /// True once the wrapper has reached the terminal state
    pub fn is_settled(&self) -> bool {
        self.status == PendingSaleStatus::Settled.as_str()
    }
}
