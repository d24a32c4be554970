//! Transactional booking writer
//!
//! Writes the booking row, its ride detail and the payment placeholder in a
//! single Postgres transaction. The payment insert and link run inside a
//! savepoint: if either fails the savepoint is rolled back and the booking
//! still commits without a payment.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use zingcab_core::{
    models::{Booking, Payment, RideDetail},
    traits::{BookingWriter, WriteReceipt},
    AppError, AppResult,
};

use crate::repositories::booking_repo::{insert_booking, link_payment};
use crate::repositories::payment_repo::insert_payment;
use crate::repositories::ride_detail_repo::insert_ride_detail;

const PAYMENT_SAVEPOINT: &str = "booking_payment";

/// `BookingWriter` backed by one database transaction
pub struct PgTransactionalBookingWriter {
    pool: PgPool,
}

impl PgTransactionalBookingWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingWriter for PgTransactionalBookingWriter {
    #[instrument(skip(self, booking, detail), fields(booking_id = %booking.id, ride_type = %booking.ride_type))]
    async fn write(&self, booking: Booking, detail: RideDetail) -> AppResult<WriteReceipt> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let mut stored = insert_booking(&mut *tx, &booking).await?;

        if let Err(e) = insert_ride_detail(&mut *tx, stored.id, &detail).await {
            error!("Ride detail insert failed, rolling back booking {}: {}", stored.id, e);
            // Dropping the transaction rolls back the booking row
            return Err(AppError::RideDetailCreationFailed(e.to_string()));
        }

        sqlx::query(&format!("SAVEPOINT {}", PAYMENT_SAVEPOINT))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Transaction(format!("Failed to create savepoint: {}", e)))?;

        let placeholder = Payment::placeholder(stored.user_id, stored.price);
        let payment = match insert_payment(&mut *tx, &placeholder).await {
            Ok(payment) => match link_payment(&mut *tx, stored.id, payment.id).await {
                Ok(()) => Some(payment),
                Err(e) => {
                    warn!("Failed to link payment to booking {}: {}", stored.id, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to create payment for booking {}: {}", stored.id, e);
                None
            }
        };

        let savepoint_sql = match payment {
            Some(_) => format!("RELEASE SAVEPOINT {}", PAYMENT_SAVEPOINT),
            None => format!("ROLLBACK TO SAVEPOINT {}", PAYMENT_SAVEPOINT),
        };
        sqlx::query(&savepoint_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Transaction(format!("Failed to close savepoint: {}", e)))?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        if let Some(p) = &payment {
            stored.payment_id = Some(p.id);
        }

        info!(
            "Created booking {} (payment linked: {})",
            stored.id,
            payment.is_some()
        );

        Ok(WriteReceipt {
            booking: stored,
            ride_detail: detail,
            payment,
        })
    }
}
