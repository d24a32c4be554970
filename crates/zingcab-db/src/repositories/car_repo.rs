//! Fleet car repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use zingcab_core::{
    models::{Car, DriverContact, FleetCar, NewCar},
    traits::CarRepository,
    AppError, AppResult,
};

use crate::pool::map_write_error;

/// PostgreSQL implementation of CarRepository
pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    #[instrument(skip(self, car))]
    async fn create(&self, car: &NewCar) -> AppResult<Car> {
        debug!("Registering car: {}", car.registration_number);

        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(
            r#"
            INSERT INTO cars (registration_number, model, cab_type)
            VALUES ($1, $2, $3)
            RETURNING id, registration_number, model, cab_type, assigned_driver_id, created_at
            "#,
        )
        .bind(&car.registration_number)
        .bind(&car.model)
        .bind(&car.cab_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error registering car: {}", e);
            map_write_error(e, "register car", "Car with this registration number already exists")
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<FleetCar>> {
        let rows = sqlx::query_as::<sqlx::Postgres, FleetCarRow>(
            r#"
            SELECT c.id, c.registration_number, c.model, c.cab_type, c.assigned_driver_id,
                   c.created_at, d.name AS driver_name, d.phone_number AS driver_phone_number
            FROM cars c
            LEFT JOIN drivers d ON d.id = c.assigned_driver_id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing cars: {}", e);
            AppError::Database(format!("Failed to list cars: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn assign_driver(&self, car_id: i32, driver_id: i32) -> AppResult<Option<Car>> {
        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(
            r#"
            UPDATE cars
            SET assigned_driver_id = $2
            WHERE id = $1
            RETURNING id, registration_number, model, cab_type, assigned_driver_id, created_at
            "#,
        )
        .bind(car_id)
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error assigning car {}: {}", car_id, e);
            AppError::Database(format!("Failed to assign car to driver: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: i32,
    registration_number: String,
    model: String,
    cab_type: String,
    assigned_driver_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Self {
            id: row.id,
            registration_number: row.registration_number,
            model: row.model,
            cab_type: row.cab_type,
            assigned_driver_id: row.assigned_driver_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FleetCarRow {
    #[sqlx(flatten)]
    car: CarRow,
    driver_name: Option<String>,
    driver_phone_number: Option<String>,
}

impl From<FleetCarRow> for FleetCar {
    fn from(row: FleetCarRow) -> Self {
        let driver = match (row.driver_name, row.driver_phone_number) {
            (Some(name), Some(phone_number)) => Some(DriverContact { name, phone_number }),
            _ => None,
        };
        Self {
            car: row.car.into(),
            driver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_duplicate_registration_is_conflict() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/zingcab".to_string());
        let pool = PgPool::connect(&url).await.unwrap();
        let repo = PgCarRepository::new(pool);

        let car = NewCar {
            registration_number: "KA01AB1234".to_string(),
            model: "Dzire".to_string(),
            cab_type: "Sedan".to_string(),
        };

        let _ = repo.create(&car).await;
        let err = repo.create(&car).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.assign_driver(i32::MAX, 1).await.unwrap().is_none());
    }
}
