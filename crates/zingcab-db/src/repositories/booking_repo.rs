//! Booking repository implementation
//!
//! Provides PostgreSQL-backed storage for base booking rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use zingcab_core::{
    models::{Booking, BookingStatus, RideType},
    traits::BookingRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse booking status from string
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or_default()
    }

    /// Parse ride type from string
    fn parse_ride_type(s: &str) -> RideType {
        RideType::from_str(s).unwrap_or(RideType::Airport)
    }
}

/// Insert a booking row on any executor (pool or open transaction)
pub(crate) async fn insert_booking<'e, E>(executor: E, booking: &Booking) -> AppResult<Booking>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(
        r#"
        INSERT INTO bookings (
            id, user_id, ride_type, distance, price,
            coupon_id, status, payment_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING
            id, user_id, ride_type, distance, price,
            coupon_id, status, payment_id, created_at, updated_at
        "#,
    )
    .bind(booking.id)
    .bind(booking.user_id)
    .bind(booking.ride_type.to_string())
    .bind(booking.distance)
    .bind(booking.price)
    .bind(booking.coupon_id)
    .bind(booking.status.to_string())
    .bind(booking.payment_id)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        error!("Database error creating booking: {}", e);
        AppError::Database(format!("Failed to create booking: {}", e))
    })?;

    Ok(row.into())
}

/// Link a payment to a booking on any executor
pub(crate) async fn link_payment<'e, E>(executor: E, id: Uuid, payment_id: Uuid) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE bookings
        SET payment_id = $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(payment_id)
    .execute(executor)
    .await
    .map_err(|e| {
        error!("Database error linking payment to booking {}: {}", id, e);
        AppError::Database(format!("Failed to link payment: {}", e))
    })?;

    Ok(())
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn insert(&self, booking: &Booking) -> AppResult<Booking> {
        debug!("Creating {} booking for user {}", booking.ride_type, booking.user_id);
        insert_booking(&self.pool, booking).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, user_id, ride_type, distance, price,
                coupon_id, status, payment_id, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<bool> {
        debug!("Updating booking {} status to {}", id, status);

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking {} status: {}", id, e);
            AppError::Database(format!("Failed to update booking status: {}", e))
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_payment(&self, id: Uuid, payment_id: Uuid) -> AppResult<()> {
        link_payment(&self.pool, id, payment_id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting booking: {}", id);

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting booking {}: {}", id, e);
                AppError::Database(format!("Failed to delete booking: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        debug!("Listing bookings for user {}", user_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, user_id, ride_type, distance, price,
                coupon_id, status, payment_id, created_at, updated_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings for user {}: {}", user_id, e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        debug!(
            "Listing bookings status={:?} limit={} offset={}",
            status, limit, offset
        );

        let status = status.map(|s| s.to_string());

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(
            r#"
            SELECT
                id, user_id, ride_type, distance, price,
                coupon_id, status, payment_id, created_at, updated_at
            FROM bookings
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookingRow {
    id: Uuid,
    user_id: i32,
    ride_type: String,
    distance: i32,
    price: Decimal,
    coupon_id: Option<Uuid>,
    status: String,
    payment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            ride_type: PgBookingRepository::parse_ride_type(&row.ride_type),
            distance: row.distance,
            price: row.price,
            coupon_id: row.coupon_id,
            status: PgBookingRepository::parse_status(&row.status),
            payment_id: row.payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
