use sqlx::{Executor, Postgres};

/// SaleLookupTable entity: a pure join row linking a token and its project
/// to a sale, for reverse lookups. One row per (token, sale) pair, so a
/// bundle sale produces several rows.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SaleLookupTable {
    pub id: String,
    pub project_id: String,
    pub token_id: String,
    pub sale_id: String,
    pub block_number: i64,
}

/// Input for creating a new lookup row
#[derive(Debug, Clone)]
pub struct NewSaleLookupTable {
    pub id: String,
    pub project_id: String,
    pub token_id: String,
    pub sale_id: String,
    pub block_number: i64,
}

impl SaleLookupTable {
    /// Create a new lookup row
    pub async fn create<'c, E>(
        row: &NewSaleLookupTable,
        connection: E,
    ) -> Result<SaleLookupTable, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO sale_lookup_tables (id, project_id, token_id, sale_id, block_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, SaleLookupTable>(query)
            .bind(&row.id)
            .bind(&row.project_id)
            .bind(&row.token_id)
            .bind(&row.sale_id)
            .bind(row.block_number)
            .fetch_one(connection)
            .await
    }

    /// Find lookup rows for a token
    pub async fn find_by_token_id<'c, E>(
        token_id: &str,
        connection: E,
    ) -> Result<Vec<SaleLookupTable>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SaleLookupTable>(
            "SELECT * FROM sale_lookup_tables WHERE token_id = $1",
        )
        .bind(token_id)
        .fetch_all(connection)
        .await
    }

    /// Find lookup rows for a project
    pub async fn find_by_project_id<'c, E>(
        project_id: &str,
        connection: E,
    ) -> Result<Vec<SaleLookupTable>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SaleLookupTable>(
            "SELECT * FROM sale_lookup_tables WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(connection)
        .await
    }
}
