use sqlx::{types::BigDecimal, Executor, Postgres};

/// How a sale was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    Native,
    Erc20,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Native => "Native",
            PaymentType::Erc20 => "ERC20",
        }
    }
}

/// Payment entity: the funds leg of a sale, keyed by `<saleId>-<index>`.
/// Index is always 0 today; the key shape leaves room for multi-payment
/// sales. Immutable once created.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    /// "Native" or "ERC20", see [`PaymentType`]
    pub payment_type: String,
    /// Payment token contract, zero address for the chain's native coin
    pub payment_token: String,
    /// Settlement price in wei
    pub price: BigDecimal,
    pub recipient: String,
}

/// Input for creating a new payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: String,
    pub sale_id: String,
    pub payment_type: String,
    pub payment_token: String,
    pub price: BigDecimal,
    pub recipient: String,
}

impl Payment {
    /// Create a new payment record
    pub async fn create<'c, E>(payment: &NewPayment, connection: E) -> Result<Payment, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO payments (id, sale_id, payment_type, payment_token, price, recipient)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, Payment>(query)
            .bind(&payment.id)
            .bind(&payment.sale_id)
            .bind(&payment.payment_type)
            .bind(&payment.payment_token)
            .bind(&payment.price)
            .bind(&payment.recipient)
            .fetch_one(connection)
            .await
    }

    /// Find payments for a sale
    pub async fn find_by_sale_id<'c, E>(
        sale_id: &str,
        connection: E,
    ) -> Result<Vec<Payment>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE sale_id = $1 ORDER BY id ASC")
            .bind(sale_id)
            .fetch_all(connection)
            .await
    }
}
