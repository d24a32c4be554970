//! Ride detail repository implementation
//!
//! Each ride type has its own table keyed by `booking_id`; the variant of
//! `RideDetail` picks the table.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use zingcab_core::{
    models::{AirportDetail, OutstationDetail, RentalDetail, RideDetail, RideType},
    traits::RideDetailRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of RideDetailRepository
pub struct PgRideDetailRepository {
    pool: PgPool,
}

impl PgRideDetailRepository {
    /// Create a new ride detail repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_rentals(&self, ids: &[Uuid]) -> AppResult<Vec<(Uuid, RideDetail)>> {
        let rows = sqlx::query_as::<sqlx::Postgres, RentalRow>(
            r#"
            SELECT booking_id, pickup_location, rental_package, pickup_date, pickup_time, cab_type
            FROM rental_rides
            WHERE booking_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| fetch_error("rental", e))?;

        Ok(rows.into_iter().map(RentalRow::into_pair).collect())
    }

    async fn find_airports(&self, ids: &[Uuid]) -> AppResult<Vec<(Uuid, RideDetail)>> {
        let rows = sqlx::query_as::<sqlx::Postgres, AirportRow>(
            r#"
            SELECT booking_id, pickup_location, drop_location, pickup_date, pickup_time, cab_type
            FROM airport_rides
            WHERE booking_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| fetch_error("airport", e))?;

        Ok(rows.into_iter().map(AirportRow::into_pair).collect())
    }

    async fn find_outstations(&self, ids: &[Uuid]) -> AppResult<Vec<(Uuid, RideDetail)>> {
        let rows = sqlx::query_as::<sqlx::Postgres, OutstationRow>(
            r#"
            SELECT booking_id, pickup_location, drop_location, pickup_date, pickup_time,
                   cab_type, drop_off_date
            FROM outstation_rides
            WHERE booking_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| fetch_error("outstation", e))?;

        Ok(rows.into_iter().map(OutstationRow::into_pair).collect())
    }
}

fn fetch_error(table: &str, e: sqlx::Error) -> AppError {
    error!("Database error fetching {} ride details: {}", table, e);
    AppError::Database(format!("Failed to fetch {} ride details: {}", table, e))
}

/// Insert the ride detail variant on any executor (pool or open transaction)
pub(crate) async fn insert_ride_detail<'e, E>(
    executor: E,
    booking_id: Uuid,
    detail: &RideDetail,
) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let result = match detail {
        RideDetail::Rental(d) => {
            sqlx::query(
                r#"
                INSERT INTO rental_rides (
                    booking_id, pickup_location, rental_package, pickup_date, pickup_time, cab_type
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(booking_id)
            .bind(&d.pickup_location)
            .bind(&d.rental_package)
            .bind(d.pickup_date)
            .bind(&d.pickup_time)
            .bind(&d.cab_type)
            .execute(executor)
            .await
        }
        RideDetail::Airport(d) => {
            sqlx::query(
                r#"
                INSERT INTO airport_rides (
                    booking_id, pickup_location, drop_location, pickup_date, pickup_time, cab_type
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(booking_id)
            .bind(&d.pickup_location)
            .bind(&d.drop_location)
            .bind(d.pickup_date)
            .bind(&d.pickup_time)
            .bind(&d.cab_type)
            .execute(executor)
            .await
        }
        RideDetail::Outstation(d) => {
            sqlx::query(
                r#"
                INSERT INTO outstation_rides (
                    booking_id, pickup_location, drop_location, pickup_date, pickup_time,
                    cab_type, drop_off_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(booking_id)
            .bind(&d.pickup_location)
            .bind(&d.drop_location)
            .bind(d.pickup_date)
            .bind(&d.pickup_time)
            .bind(&d.cab_type)
            .bind(d.drop_off_date)
            .execute(executor)
            .await
        }
    };

    result.map_err(|e| {
        error!(
            "Database error creating {} details for booking {}: {}",
            detail.ride_type(),
            booking_id,
            e
        );
        AppError::Database(format!("Failed to create ride details: {}", e))
    })?;

    Ok(())
}

#[async_trait]
impl RideDetailRepository for PgRideDetailRepository {
    #[instrument(skip(self, detail))]
    async fn insert(&self, booking_id: Uuid, detail: &RideDetail) -> AppResult<()> {
        debug!("Creating {} details for booking {}", detail.ride_type(), booking_id);
        insert_ride_detail(&self.pool, booking_id, detail).await
    }

    #[instrument(skip(self))]
    async fn find_by_booking(
        &self,
        booking_id: Uuid,
        ride_type: RideType,
    ) -> AppResult<Option<RideDetail>> {
        let ids = [booking_id];
        let found = match ride_type {
            RideType::Rental => self.find_rentals(&ids).await?,
            RideType::Airport => self.find_airports(&ids).await?,
            RideType::Outstation => self.find_outstations(&ids).await?,
        };

        Ok(found.into_iter().next().map(|(_, detail)| detail))
    }

    #[instrument(skip(self, booking_ids), fields(count = booking_ids.len()))]
    async fn find_for_bookings(&self, booking_ids: &[Uuid]) -> AppResult<Vec<(Uuid, RideDetail)>> {
        if booking_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut details = self.find_rentals(booking_ids).await?;
        details.extend(self.find_airports(booking_ids).await?);
        details.extend(self.find_outstations(booking_ids).await?);
        Ok(details)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RentalRow {
    booking_id: Uuid,
    pickup_location: String,
    rental_package: String,
    pickup_date: NaiveDate,
    pickup_time: String,
    cab_type: String,
}

impl RentalRow {
    fn into_pair(self) -> (Uuid, RideDetail) {
        (
            self.booking_id,
            RideDetail::Rental(RentalDetail {
                pickup_location: self.pickup_location,
                rental_package: self.rental_package,
                pickup_date: self.pickup_date,
                pickup_time: self.pickup_time,
                cab_type: self.cab_type,
            }),
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AirportRow {
    booking_id: Uuid,
    pickup_location: String,
    drop_location: String,
    pickup_date: NaiveDate,
    pickup_time: String,
    cab_type: String,
}

impl AirportRow {
    fn into_pair(self) -> (Uuid, RideDetail) {
        (
            self.booking_id,
            RideDetail::Airport(AirportDetail {
                pickup_location: self.pickup_location,
                drop_location: self.drop_location,
                pickup_date: self.pickup_date,
                pickup_time: self.pickup_time,
                cab_type: self.cab_type,
            }),
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OutstationRow {
    booking_id: Uuid,
    pickup_location: String,
    drop_location: String,
    pickup_date: NaiveDate,
    pickup_time: String,
    cab_type: String,
    drop_off_date: NaiveDate,
}

impl OutstationRow {
    fn into_pair(self) -> (Uuid, RideDetail) {
        (
            self.booking_id,
            RideDetail::Outstation(OutstationDetail {
                pickup_location: self.pickup_location,
                drop_location: self.drop_location,
                pickup_date: self.pickup_date,
                pickup_time: self.pickup_time,
                cab_type: self.cab_type,
                drop_off_date: self.drop_off_date,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_outstation_row_keeps_return_date() {
        let booking_id = Uuid::new_v4();
        let row = OutstationRow {
            booking_id,
            pickup_location: "Pune".to_string(),
            drop_location: "Mumbai".to_string(),
            pickup_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            pickup_time: "06:00".to_string(),
            cab_type: "SUV".to_string(),
            drop_off_date: NaiveDate::from_ymd_opt(2026, 12, 3).unwrap(),
        };

        let (id, detail) = row.into_pair();
        assert_eq!(id, booking_id);
        assert_eq!(detail.ride_type(), RideType::Outstation);
        assert!(matches!(detail, RideDetail::Outstation(d) if d.drop_off_date.day() == 3));
    }
}
