//! Coupon repository implementation
//!
//! Coupons are managed outside the engine; this repository only reads them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;
use zingcab_core::{models::Coupon, traits::CouponRepository, AppError, AppResult};

/// PostgreSQL implementation of CouponRepository
pub struct PgCouponRepository {
    pool: PgPool,
}

impl PgCouponRepository {
    /// Create a new coupon repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for PgCouponRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Coupon>> {
        debug!("Finding coupon by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, CouponRow>(
            r#"
            SELECT id, code, discount_amount, expiry_date
            FROM coupons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding coupon {}: {}", id, e);
            AppError::Database(format!("Failed to find coupon: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: Option<String>,
    discount_amount: Decimal,
    expiry_date: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            discount_amount: row.discount_amount,
            expiry_date: row.expiry_date,
        }
    }
}
