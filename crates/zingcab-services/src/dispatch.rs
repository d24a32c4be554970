//! Driver dispatch
//!
//! A booking has at most one assignment row. Assigning again overwrites the
//! driver in place; there is no history of earlier drivers.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use zingcab_core::{
    models::{AssignmentStatus, BookingDetails, BookingStatus, DriverAssignment, RideDetail},
    traits::{AssignmentRepository, BookingRepository, DriverRepository, RideDetailRepository},
    AppError, AppResult,
};

/// An assignment as the driver sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRide {
    #[serde(flatten)]
    pub assignment: DriverAssignment,

    /// Absent if the booking row is gone
    pub booking: Option<BookingDetails>,
}

/// Assignment written by `assign_driver` and the booking status after it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOutcome {
    #[serde(flatten)]
    pub assignment: DriverAssignment,

    pub booking_status: BookingStatus,

    /// Whether `DRIVER_ASSIGNED` was written onto the booking by this call
    #[serde(skip)]
    pub mirrored: bool,
}

pub struct DispatchManager {
    bookings: Arc<dyn BookingRepository>,
    details: Arc<dyn RideDetailRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    drivers: Arc<dyn DriverRepository>,
}

impl DispatchManager {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        details: Arc<dyn RideDetailRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        drivers: Arc<dyn DriverRepository>,
    ) -> Self {
        Self {
            bookings,
            details,
            assignments,
            drivers,
        }
    }

    /// Bind a driver to a booking
    ///
    /// Creates the assignment if the booking has none and then moves the
    /// booking to `DRIVER_ASSIGNED` as a best-effort second write. If an
    /// assignment exists, its driver is overwritten and it is reset to
    /// `ASSIGNED`; the booking status is left as it is. Concurrent calls for
    /// one booking resolve last-write-wins through the store's upsert.
    #[instrument(skip(self))]
    pub async fn assign_driver(&self, booking_id: Uuid, driver_id: i32) -> AppResult<AssignOutcome> {
        if self.drivers.find_by_id(driver_id).await?.is_none() {
            return Err(AppError::DriverNotFound(driver_id.to_string()));
        }

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if booking.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot assign driver to booking with status: {}",
                booking.status
            )));
        }

        let existing = self.assignments.find_by_booking(booking_id).await.map_err(|e| {
            error!("Assignment lookup failed for booking {}: {}", booking_id, e);
            AppError::AssignmentLookupFailed(e.to_string())
        })?;

        let (assignment, created) = match existing {
            Some(current) => {
                if current.driver_id != driver_id {
                    info!(
                        "Reassigning booking {} from driver {} to driver {}",
                        booking_id, current.driver_id, driver_id
                    );
                }
                (self.assignments.reassign(current.id, driver_id).await?, false)
            }
            None => self
                .assignments
                .upsert(&DriverAssignment::new(booking_id, driver_id))
                .await?,
        };

        if !created {
            return Ok(AssignOutcome {
                assignment,
                booking_status: booking.status,
                mirrored: false,
            });
        }

        info!("Driver {} assigned to booking {}", driver_id, booking_id);
        let mirrored = self.mirror_booking(booking_id, BookingStatus::DriverAssigned).await;
        Ok(AssignOutcome {
            assignment,
            booking_status: if mirrored {
                BookingStatus::DriverAssigned
            } else {
                booking.status
            },
            mirrored,
        })
    }

    /// A driver's rides, newest first, with booking and ride detail
    #[instrument(skip(self))]
    pub async fn driver_rides(
        &self,
        driver_id: i32,
        status: Option<AssignmentStatus>,
    ) -> AppResult<Vec<DriverRide>> {
        let assignments = self.assignments.list_by_driver(driver_id, status).await?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = assignments.iter().map(|a| a.booking_id).collect();
        let mut details: HashMap<Uuid, RideDetail> =
            self.details.find_for_bookings(&ids).await?.into_iter().collect();

        let mut rides = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let booking = self
                .bookings
                .find_by_id(assignment.booking_id)
                .await?
                .map(|b| BookingDetails::new(b, details.remove(&assignment.booking_id)));
            rides.push(DriverRide { assignment, booking });
        }

        Ok(rides)
    }

    async fn mirror_booking(&self, booking_id: Uuid, status: BookingStatus) -> bool {
        match self.bookings.update_status(booking_id, status).await {
            Ok(true) => true,
            Ok(false) => {
                warn!("Booking {} not found while setting {}", booking_id, status);
                false
            }
            Err(e) => {
                error!("Failed to set booking {} to {}: {}", booking_id, status, e);
                false
            }
        }
    }
}
