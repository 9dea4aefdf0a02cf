use serde::Serialize;
use sqlx::{types::chrono, Executor, Postgres};

/// Kind of a recorded sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleType {
    Single,
    Bundle,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Single => "Single",
            SaleType::Bundle => "Bundle",
        }
    }
}

/// Sale entity: one row per reconstructed marketplace sale, keyed by
/// `<tokenId>-<saleCounter>` of the lead token. Immutable once created.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Sale {
    pub id: String,
    pub tx_hash: String,
    /// Which exchange deployment the sale settled on
    pub exchange_tag: String,
    /// "Single" or "Bundle", see [`SaleType`]
    pub sale_type: String,
    pub block_number: i64,
    pub block_timestamp: chrono::DateTime<chrono::Utc>,
    pub buyer: String,
    pub seller: String,
    /// True when the sell order named a specific counterparty
    pub is_private: bool,
    /// Colon-joined composite token ids covered by this sale
    pub summary_tokens_sold: String,
}

/// Input for creating a new sale
#[derive(Debug, Clone)]
pub struct NewSale {
    pub id: String,
    pub tx_hash: String,
    pub exchange_tag: String,
    pub sale_type: String,
    pub block_number: i64,
    pub block_timestamp: chrono::DateTime<chrono::Utc>,
    pub buyer: String,
    pub seller: String,
    pub is_private: bool,
    pub summary_tokens_sold: String,
}

impl Sale {
    /// Create a new sale record
    pub async fn create<'c, E>(sale: &NewSale, connection: E) -> Result<Sale, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO sales (
                id, tx_hash, exchange_tag, sale_type, block_number,
                block_timestamp, buyer, seller, is_private, summary_tokens_sold
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, Sale>(query)
            .bind(&sale.id)
            .bind(&sale.tx_hash)
            .bind(&sale.exchange_tag)
            .bind(&sale.sale_type)
            .bind(sale.block_number)
            .bind(sale.block_timestamp)
            .bind(&sale.buyer)
            .bind(&sale.seller)
            .bind(sale.is_private)
            .bind(&sale.summary_tokens_sold)
            .fetch_one(connection)
            .await
    }

    /// Find sale by id
    pub async fn find_by_id<'c, E>(id: &str, connection: E) -> Result<Option<Sale>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(connection)
            .await
    }

    /// Find sales in a transaction
    pub async fn find_by_tx_hash<'c, E>(
        tx_hash: &str,
        connection: E,
    ) -> Result<Vec<Sale>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE tx_hash = $1")
            .bind(tx_hash)
            .fetch_all(connection)
            .await
    }
}
