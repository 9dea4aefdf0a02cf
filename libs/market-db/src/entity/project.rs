use sqlx::{
    types::{chrono, BigDecimal},
    Executor, Postgres,
};

/// Project entity representing a tracked minting project (one NFT collection
/// slice on a shared core contract, or a whole standalone contract)
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Project {
    pub id: String,
    pub contract_address: String,
    pub name: Option<String>,
    /// Running total of settled marketplace volume attributed to this
    /// project, in wei
    pub sale_volume_wei: Option<BigDecimal>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub id: String,
    pub contract_address: String,
    pub name: Option<String>,
}

impl Project {
    /// Create a new project record
    pub async fn create<'c, E>(project: &NewProject, connection: E) -> Result<Project, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO projects (id, contract_address, name, sale_volume_wei, created_at)
            VALUES ($1, $2, $3, 0, NOW())
            ON CONFLICT (id) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, projects.name),
                last_updated = NOW()
            RETURNING *
        "#;

        sqlx::query_as::<_, Project>(query)
            .bind(&project.id)
            .bind(&project.contract_address)
            .bind(&project.name)
            .fetch_one(connection)
            .await
    }

    /// Find project by id
    pub async fn find_by_id<'c, E>(
        id: &str,
        connection: E,
    ) -> Result<Option<Project>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(connection)
            .await
    }

    /// Add a settled sale amount to the project's running volume total
    pub async fn add_sale_volume<'c, E>(
        id: &str,
        amount_wei: &BigDecimal,
        connection: E,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE projects SET
                sale_volume_wei = COALESCE(sale_volume_wei, 0) + $2,
                last_updated = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(amount_wei)
        .execute(connection)
        .await?;

        Ok(())
    }
}
