//! Driver assignment repository implementation
//!
//! Backed by the `driver_bookings` table, which carries a unique index on
//! `booking_id` so a booking can never hold two assignment rows. Inserts
//! upsert on that key, so two racing assigns end with the later driver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;
use zingcab_core::{
    models::{AssignmentStatus, DriverAssignment},
    traits::AssignmentRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of AssignmentRepository
pub struct PgAssignmentRepository {
    pool: PgPool,
}

impl PgAssignmentRepository {
    /// Create a new assignment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse assignment status from string
    fn parse_status(s: &str) -> AssignmentStatus {
        AssignmentStatus::from_str(s).unwrap_or_default()
    }
}

#[async_trait]
impl AssignmentRepository for PgAssignmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DriverAssignment>> {
        debug!("Finding driver booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            SELECT id, booking_id, driver_id, status, created_at, updated_at
            FROM driver_bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding driver booking {}: {}", id, e);
            AppError::Database(format!("Failed to find driver booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<DriverAssignment>> {
        debug!("Finding driver booking for booking {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            SELECT id, booking_id, driver_id, status, created_at, updated_at
            FROM driver_bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding driver booking for booking {}: {}",
                booking_id, e
            );
            AppError::Database(format!("Failed to find driver booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, assignment), fields(booking_id = %assignment.booking_id))]
    async fn upsert(&self, assignment: &DriverAssignment) -> AppResult<(DriverAssignment, bool)> {
        debug!(
            "Creating driver booking for driver {}",
            assignment.driver_id
        );

        // A racing assign for the same booking lands on the unique key and
        // overwrites the driver; xmax is zero only for a freshly inserted row.
        let row = sqlx::query_as::<sqlx::Postgres, UpsertRow>(
            r#"
            INSERT INTO driver_bookings (id, booking_id, driver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (booking_id) DO UPDATE
                SET driver_id = EXCLUDED.driver_id,
                    status = 'ASSIGNED',
                    updated_at = NOW()
            RETURNING id, booking_id, driver_id, status, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.booking_id)
        .bind(assignment.driver_id)
        .bind(assignment.status.to_string())
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating driver booking: {}", e);
            AppError::Database(format!("Failed to create driver booking: {}", e))
        })?;

        let inserted = row.inserted;
        Ok((row.assignment.into(), inserted))
    }

    #[instrument(skip(self))]
    async fn reassign(&self, id: Uuid, driver_id: i32) -> AppResult<DriverAssignment> {
        debug!("Reassigning driver booking {} to driver {}", id, driver_id);

        let row = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            UPDATE driver_bookings
            SET driver_id = $2,
                status = 'ASSIGNED',
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, booking_id, driver_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error reassigning driver booking {}: {}", id, e);
            AppError::Database(format!("Failed to update driver booking: {}", e))
        })?
        .ok_or_else(|| AppError::AssignmentNotFound(id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> AppResult<DriverAssignment> {
        debug!("Updating driver booking {} status to {}", id, status);

        let row = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            UPDATE driver_bookings
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, booking_id, driver_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating driver booking {} status: {}", id, e);
            AppError::Database(format!("Failed to update driver booking status: {}", e))
        })?
        .ok_or_else(|| AppError::AssignmentNotFound(id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn update_status_by_booking(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE driver_bookings
            SET status = $2,
                updated_at = NOW()
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error updating driver booking for booking {}: {}",
                booking_id, e
            );
            AppError::Database(format!("Failed to update driver booking status: {}", e))
        })?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list_by_driver(
        &self,
        driver_id: i32,
        status: Option<AssignmentStatus>,
    ) -> AppResult<Vec<DriverAssignment>> {
        debug!("Listing driver bookings for driver {}", driver_id);

        let rows = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            SELECT id, booking_id, driver_id, status, created_at, updated_at
            FROM driver_bookings
            WHERE driver_id = $1
                AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(driver_id)
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing driver bookings: {}", e);
            AppError::Database(format!("Failed to list driver bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, booking_ids), fields(count = booking_ids.len()))]
    async fn find_for_bookings(&self, booking_ids: &[Uuid]) -> AppResult<Vec<DriverAssignment>> {
        if booking_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<sqlx::Postgres, AssignmentRow>(
            r#"
            SELECT id, booking_id, driver_id, status, created_at, updated_at
            FROM driver_bookings
            WHERE booking_id = ANY($1)
            "#,
        )
        .bind(booking_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching driver bookings: {}", e);
            AppError::Database(format!("Failed to fetch driver bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    booking_id: Uuid,
    driver_id: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    assignment: AssignmentRow,
    inserted: bool,
}

impl From<AssignmentRow> for DriverAssignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            driver_id: row.driver_id,
            status: PgAssignmentRepository::parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
