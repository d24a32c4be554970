//! Driver account repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use zingcab_core::{
    models::{Driver, NewDriver},
    traits::DriverRepository,
    AppError, AppResult,
};

use crate::pool::map_write_error;

/// PostgreSQL implementation of DriverRepository
pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    /// Create a new driver repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Driver>> {
        let result = sqlx::query_as::<sqlx::Postgres, DriverRow>(
            "SELECT id, name, phone_number, driving_license, created_at FROM drivers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding driver {}: {}", id, e);
            AppError::Database(format!("Failed to find driver: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Driver>> {
        let result = sqlx::query_as::<sqlx::Postgres, DriverRow>(
            r#"
            SELECT id, name, phone_number, driving_license, created_at
            FROM drivers
            WHERE phone_number = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding driver by phone: {}", e);
            AppError::Database(format!("Failed to find driver: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, driver))]
    async fn create(&self, driver: &NewDriver) -> AppResult<Driver> {
        debug!("Registering driver: {}", driver.name);

        let row = sqlx::query_as::<sqlx::Postgres, DriverRow>(
            r#"
            INSERT INTO drivers (name, phone_number, driving_license)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone_number, driving_license, created_at
            "#,
        )
        .bind(&driver.name)
        .bind(&driver.phone_number)
        .bind(&driver.driving_license)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating driver: {}", e);
            map_write_error(e, "create driver", "Driver with this phone number already exists")
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<Driver>> {
        let rows = sqlx::query_as::<sqlx::Postgres, DriverRow>(
            r#"
            SELECT id, name, phone_number, driving_license, created_at
            FROM drivers
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing drivers: {}", e);
            AppError::Database(format!("Failed to list drivers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: i32,
    name: String,
    phone_number: String,
    driving_license: String,
    created_at: DateTime<Utc>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            driving_license: row.driving_license,
            created_at: row.created_at,
        }
    }
}
