use sqlx::{
    types::{chrono, BigDecimal},
    Executor, Postgres,
};

/// Token entity representing one minted NFT tracked by the indexer.
///
/// The id is the composite `<contract>-<tokenNumber>` key, so a token is
/// unique across core contracts.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Token {
    pub id: String,
    pub contract_address: String,
    /// On-chain uint256 token number, stored as NUMERIC to keep full width
    pub token_number: BigDecimal,
    pub project_id: String,
    pub owner_address: Option<String>,
    /// Counter used to derive unique sale ids for this token. Monotone,
    /// bumped exactly once per sale that references the token.
    pub next_sale_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for creating a new token
#[derive(Debug, Clone)]
pub struct NewToken {
    pub id: String,
    pub contract_address: String,
    pub token_number: BigDecimal,
    pub project_id: String,
    pub owner_address: Option<String>,
}

impl Token {
    /// Create a new token record
    pub async fn create<'c, E>(token: &NewToken, connection: E) -> Result<Token, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO tokens (id, contract_address, token_number, project_id, owner_address, next_sale_id, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, NOW())
            ON CONFLICT (id) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, Token>(query)
            .bind(&token.id)
            .bind(&token.contract_address)
            .bind(&token.token_number)
            .bind(&token.project_id)
            .bind(&token.owner_address)
            .fetch_one(connection)
            .await
    }

    /// Find token by its composite id
    pub async fn find_by_id<'c, E>(id: &str, connection: E) -> Result<Option<Token>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Token>("SELECT * FROM tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(connection)
            .await
    }

    /// Bump the token's sale counter and return the value to use for the
    /// sale being recorded (the pre-increment counter). Run inside the same
    /// transaction as the Sale insert so a Sale is never created without
    /// its counter bump.
    pub async fn increment_next_sale_id<'c, E>(
        id: &str,
        connection: E,
    ) -> Result<i64, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as(
            r#"
            UPDATE tokens SET
                next_sale_id = next_sale_id + 1,
                last_updated = NOW()
            WHERE id = $1
            RETURNING next_sale_id - 1
            "#,
        )
        .bind(id)
        .fetch_one(connection)
        .await?;

        Ok(row.0)
    }

    /// Update the current owner (from Transfer events)
    pub async fn update_owner<'c, E>(
        id: &str,
        owner_address: &str,
        connection: E,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE tokens SET
                owner_address = $2,
                last_updated = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(owner_address)
        .execute(connection)
        .await?;

        Ok(())
    }
}
