//! Booking and assignment status synchronizer
//!
//! Each operation has one primary write that must succeed and one secondary
//! write that mirrors the new status onto the other record. The secondary
//! write is best-effort: a failure is logged and reported in `SyncOutcome`
//! but never undoes the primary.
//!
//! With `strict` set, requests are checked against the explicit transition
//! tables on `AssignmentStatus` and `BookingStatus`. A driver action must be
//! legal for the assignment, and the booking must still be able to reach the
//! mirrored status, so a lost cancel cascade cannot revive a cancelled
//! booking. Without `strict`, drivers may set any status and only the
//! cancel-after-terminal check applies.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use zingcab_core::{
    models::{AssignmentStatus, Booking, BookingStatus, DriverAction, DriverAssignment},
    traits::{AssignmentRepository, BookingRepository},
    AppError, AppResult,
};

/// Primary record after the change, and whether the mirror write landed
#[derive(Debug, Clone)]
pub struct SyncOutcome<T> {
    pub record: T,
    pub mirrored: bool,
}

pub struct StatusSynchronizer {
    bookings: Arc<dyn BookingRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    strict: bool,
}

impl StatusSynchronizer {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        strict: bool,
    ) -> Self {
        Self {
            bookings,
            assignments,
            strict,
        }
    }

    /// Driver action on one of their assignments
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        assignment_id: Uuid,
        driver_id: i32,
        action: DriverAction,
    ) -> AppResult<SyncOutcome<DriverAssignment>> {
        let current = match self.assignments.find_by_id(assignment_id).await? {
            Some(a) if a.is_held_by(driver_id) => a,
            Some(a) => {
                warn!(
                    "Driver {} acted on assignment {} held by driver {}",
                    driver_id, assignment_id, a.driver_id
                );
                return Err(not_held());
            }
            None => return Err(not_held()),
        };

        let target = action.target_status();
        if self.strict {
            if !current.status.can_transition_to(target) {
                return Err(AppError::InvalidTransition(format!(
                    "Cannot {} ride with status: {}",
                    action, current.status
                )));
            }

            let booking = self
                .bookings
                .find_by_id(current.booking_id)
                .await?
                .ok_or_else(|| AppError::BookingNotFound(current.booking_id.to_string()))?;
            if !booking.status.can_reach(target.booking_status()) {
                warn!(
                    "Assignment {} is {} but booking {} is {}",
                    assignment_id, current.status, booking.id, booking.status
                );
                return Err(AppError::InvalidTransition(format!(
                    "Cannot {} ride with booking status: {}",
                    action, booking.status
                )));
            }
        }

        let updated = self.assignments.update_status(assignment_id, target).await?;
        info!(
            "Assignment {} moved {} -> {}",
            assignment_id, current.status, updated.status
        );

        let mirrored = self
            .mirror_to_booking(updated.booking_id, target.booking_status())
            .await;

        Ok(SyncOutcome {
            record: updated,
            mirrored,
        })
    }

    /// Rider cancellation, cascading to the driver assignment
    #[instrument(skip(self))]
    pub async fn cancel(&self, booking_id: Uuid, user_id: i32) -> AppResult<SyncOutcome<Booking>> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if !booking.is_owned_by(user_id) {
            warn!("User {} tried to cancel booking {}", user_id, booking_id);
            return Err(AppError::NotAuthorized(
                "Not authorized to cancel this booking".to_string(),
            ));
        }

        let allowed = if self.strict {
            booking.status.can_transition_to(BookingStatus::Cancelled)
        } else {
            booking.status.is_cancellable()
        };
        if !allowed {
            return Err(AppError::InvalidTransition(format!(
                "Cannot cancel booking with status: {}",
                booking.status
            )));
        }

        if !self
            .bookings
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?
        {
            return Err(AppError::BookingNotFound(booking_id.to_string()));
        }
        booking.status = BookingStatus::Cancelled;
        info!("Booking {} cancelled by user {}", booking_id, user_id);

        let mirrored = match self
            .assignments
            .update_status_by_booking(booking_id, AssignmentStatus::Cancelled)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to cancel driver assignment of booking {}: {}",
                    booking_id, e
                );
                false
            }
        };

        Ok(SyncOutcome {
            record: booking,
            mirrored,
        })
    }

    async fn mirror_to_booking(&self, booking_id: Uuid, status: BookingStatus) -> bool {
        match self.bookings.update_status(booking_id, status).await {
            Ok(true) => true,
            Ok(false) => {
                warn!("Booking {} not found while mirroring {}", booking_id, status);
                false
            }
            Err(e) => {
                error!("Failed to mirror {} onto booking {}: {}", status, booking_id, e);
                false
            }
        }
    }
}

fn not_held() -> AppError {
    AppError::NotAuthorized("Driver booking not found or not authorized".to_string())
}
