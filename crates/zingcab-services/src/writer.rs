//! Compensating booking writer
//!
//! For stores without multi-row transactions. Writes run in order and a hard
//! failure undoes the earlier writes by hand:
//!
//! 1. booking row
//! 2. ride detail; on failure the booking row is deleted
//! 3. payment placeholder; failure is logged and tolerated
//! 4. payment link; failure is logged and tolerated

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use zingcab_core::{
    models::{Booking, Payment, RideDetail},
    traits::{
        BookingRepository, BookingWriter, PaymentRepository, RideDetailRepository, WriteReceipt,
    },
    AppError, AppResult,
};

pub struct CompensatingBookingWriter {
    bookings: Arc<dyn BookingRepository>,
    details: Arc<dyn RideDetailRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl CompensatingBookingWriter {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        details: Arc<dyn RideDetailRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            bookings,
            details,
            payments,
        }
    }

    async fn compensate(&self, booking: &Booking) {
        match self.bookings.delete(booking.id).await {
            Ok(true) => info!("Compensated: deleted booking {}", booking.id),
            Ok(false) => warn!("Compensation found no booking {} to delete", booking.id),
            Err(e) => error!(
                "Compensation failed, booking {} left without ride detail: {}",
                booking.id, e
            ),
        }
    }

    async fn attach_payment(&self, booking: &mut Booking) -> Option<Payment> {
        let placeholder = Payment::placeholder(booking.user_id, booking.price);

        let payment = match self.payments.insert(&placeholder).await {
            Ok(payment) => payment,
            Err(e) => {
                warn!("Failed to create payment for booking {}: {}", booking.id, e);
                return None;
            }
        };

        match self.bookings.set_payment(booking.id, payment.id).await {
            Ok(()) => booking.payment_id = Some(payment.id),
            Err(e) => warn!(
                "Failed to link payment {} to booking {}: {}",
                payment.id, booking.id, e
            ),
        }

        Some(payment)
    }
}

#[async_trait]
impl BookingWriter for CompensatingBookingWriter {
    #[instrument(skip(self, booking, detail), fields(booking_id = %booking.id, ride_type = %booking.ride_type))]
    async fn write(&self, booking: Booking, detail: RideDetail) -> AppResult<WriteReceipt> {
        let mut stored = self.bookings.insert(&booking).await?;

        if let Err(e) = self.details.insert(stored.id, &detail).await {
            error!("Ride detail insert failed for booking {}: {}", stored.id, e);
            self.compensate(&stored).await;
            return Err(AppError::RideDetailCreationFailed(e.to_string()));
        }

        let payment = self.attach_payment(&mut stored).await;

        info!(
            "Created booking {} (payment linked: {})",
            stored.id,
            stored.payment_id.is_some()
        );

        Ok(WriteReceipt {
            booking: stored,
            ride_detail: detail,
            payment,
        })
    }
}
