//! Contact-us query repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, instrument};
use zingcab_core::{
    models::{ContactQuery, NewContactQuery},
    traits::ContactRepository,
    AppError, AppResult,
};

pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    #[instrument(skip(self, query))]
    async fn create(&self, query: &NewContactQuery) -> AppResult<ContactQuery> {
        let row = sqlx::query_as::<sqlx::Postgres, ContactQueryRow>(
            r#"
            INSERT INTO contact_queries (name, phone_number, email, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone_number, email, message, created_at
            "#,
        )
        .bind(&query.name)
        .bind(&query.phone_number)
        .bind(&query.email)
        .bind(&query.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error saving contact query: {}", e);
            AppError::Database(format!("Failed to save contact query: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<ContactQuery>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ContactQueryRow>(
            r#"
            SELECT id, name, phone_number, email, message, created_at
            FROM contact_queries
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing contact queries: {}", e);
            AppError::Database(format!("Failed to list contact queries: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactQueryRow {
    id: i32,
    name: String,
    phone_number: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<ContactQueryRow> for ContactQuery {
    fn from(row: ContactQueryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}
