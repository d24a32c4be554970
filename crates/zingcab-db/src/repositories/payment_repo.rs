//! Payment repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use zingcab_core::{
    models::{Payment, PaymentMethod, PaymentStatus},
    traits::PaymentRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of PaymentRepository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert a payment row on any executor (pool or open transaction)
pub(crate) async fn insert_payment<'e, E>(executor: E, payment: &Payment) -> AppResult<Payment>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
        r#"
        INSERT INTO payments (id, amount, payment_status, payment_method, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, amount, payment_status, payment_method, user_id, created_at
        "#,
    )
    .bind(payment.id)
    .bind(payment.amount)
    .bind(payment.payment_status.to_string())
    .bind(payment.payment_method.to_string())
    .bind(payment.user_id)
    .bind(payment.created_at)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        error!("Database error creating payment: {}", e);
        AppError::Database(format!("Failed to create payment: {}", e))
    })?;

    Ok(row.into())
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn insert(&self, payment: &Payment) -> AppResult<Payment> {
        debug!("Creating payment placeholder for user {}", payment.user_id);
        insert_payment(&self.pool, payment).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let result = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT id, amount, payment_status, payment_method, user_id, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payment {}: {}", id, e);
            AppError::Database(format!("Failed to find payment: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    amount: Decimal,
    payment_status: String,
    payment_method: String,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            payment_status: PaymentStatus::from_str(&row.payment_status).unwrap_or_default(),
            payment_method: PaymentMethod::from_str(&row.payment_method).unwrap_or_default(),
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}
