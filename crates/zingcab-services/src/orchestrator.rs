//! Booking orchestrator
//!
//! Turns a priced ride into a stored booking with its ride detail and payment
//! placeholder, and serves the joined booking views riders and admins read.
//! How the rows are written is the job of the injected `BookingWriter`.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use zingcab_core::{
    models::{
        Booking, BookingDetails, BookingDraft, BookingStatus, DriverAssignment, RideDetail,
        RideRequest,
    },
    traits::{
        AssignmentRepository, BookingRepository, BookingWriter, PaginatedResponse, Pagination,
        PaginationMeta, RideDetailRepository,
    },
    AppError, AppResult,
};

use crate::pricing::PricingEngine;

pub struct BookingOrchestrator {
    bookings: Arc<dyn BookingRepository>,
    details: Arc<dyn RideDetailRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    writer: Arc<dyn BookingWriter>,
    pricing: Arc<PricingEngine>,
}

impl BookingOrchestrator {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        details: Arc<dyn RideDetailRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        writer: Arc<dyn BookingWriter>,
        pricing: Arc<PricingEngine>,
    ) -> Self {
        Self {
            bookings,
            details,
            assignments,
            writer,
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Persist a priced ride for a rider
    ///
    /// An unknown ride type fails before anything is written. A ride detail
    /// failure leaves no booking behind. A payment failure is tolerated and
    /// the booking comes back without `paymentId`. If the final re-read
    /// fails, the rows already held in memory are returned instead.
    #[instrument(skip(self, draft), fields(ride_type = %draft.ride.ride_type))]
    pub async fn create_booking(&self, draft: BookingDraft, user_id: i32) -> AppResult<BookingDetails> {
        let detail = RideDetail::from_request(&draft.ride)?;
        let booking = Booking::pending(user_id, detail.ride_type(), &draft);

        let receipt = self.writer.write(booking, detail).await?;
        let booking_id = receipt.booking.id;

        match self.reload(booking_id).await {
            Ok(Some(details)) => Ok(details),
            Ok(None) => {
                warn!("Booking {} vanished before re-read, returning written rows", booking_id);
                Ok(BookingDetails::new(receipt.booking, Some(receipt.ride_detail)))
            }
            Err(e) => {
                warn!("Re-read of booking {} failed, returning written rows: {}", booking_id, e);
                Ok(BookingDetails::new(receipt.booking, Some(receipt.ride_detail)))
            }
        }
    }

    /// Quote, apply the coupon, then create
    ///
    /// Rentals are priced as packages whatever drop location was sent.
    #[instrument(skip(self, ride), fields(ride_type = %ride.ride_type))]
    pub async fn quote_and_create(&self, ride: RideRequest, user_id: i32) -> AppResult<BookingDetails> {
        let ride_type = RideDetail::from_request(&ride)?.ride_type();

        let drop = if ride_type.needs_drop_location() {
            ride.drop_location.as_deref()
        } else {
            None
        };
        let quote = self.pricing.quote(&ride.pickup_location, drop, &ride.cab_type);
        let applied = self.pricing.apply_coupon(ride.coupon_id, quote.price).await?;

        debug!(
            "Priced {} ride: {} km, {} -> {}",
            ride_type, quote.distance, quote.price, applied.final_price
        );

        self.create_booking(
            BookingDraft {
                ride,
                distance: quote.distance,
                final_price: applied.final_price,
            },
            user_id,
        )
        .await
    }

    /// A rider's own booking; someone else's is `NotAuthorized`
    #[instrument(skip(self))]
    pub async fn get_booking(&self, id: Uuid, user_id: i32) -> AppResult<BookingDetails> {
        let details = self.get_booking_any(id).await?;

        if !details.booking.is_owned_by(user_id) {
            warn!("User {} tried to read booking {} of user {}", user_id, id, details.booking.user_id);
            return Err(AppError::NotAuthorized(
                "Not authorized to access this booking".to_string(),
            ));
        }

        Ok(details)
    }

    /// Any booking, no ownership check
    pub async fn get_booking_any(&self, id: Uuid) -> AppResult<BookingDetails> {
        let details = self
            .reload(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        let assignment = self.assignments.find_by_booking(id).await?;
        Ok(details.with_assignment(assignment))
    }

    /// A rider's bookings, newest first, with ride details
    #[instrument(skip(self))]
    pub async fn list_user_bookings(&self, user_id: i32) -> AppResult<Vec<BookingDetails>> {
        let bookings = self.bookings.list_by_user(user_id).await?;
        self.join_details(bookings, false).await
    }

    /// Every booking, newest first, with ride details and assignments
    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        status: Option<BookingStatus>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<BookingDetails>> {
        let (bookings, total) = self
            .bookings
            .list_filtered(status, pagination.limit(), pagination.offset())
            .await?;

        let data = self.join_details(bookings, true).await?;
        info!("Listed {} of {} bookings", data.len(), total);

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total, pagination.page, pagination.per_page),
        })
    }

    async fn reload(&self, id: Uuid) -> AppResult<Option<BookingDetails>> {
        let Some(booking) = self.bookings.find_by_id(id).await? else {
            return Ok(None);
        };
        let detail = self.details.find_by_booking(id, booking.ride_type).await?;
        Ok(Some(BookingDetails::new(booking, detail)))
    }

    async fn join_details(
        &self,
        bookings: Vec<Booking>,
        with_assignments: bool,
    ) -> AppResult<Vec<BookingDetails>> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = bookings.iter().map(|b| b.id).collect();

        let mut details: HashMap<Uuid, RideDetail> =
            self.details.find_for_bookings(&ids).await?.into_iter().collect();

        let mut assignments: HashMap<Uuid, DriverAssignment> = if with_assignments {
            self.assignments
                .find_for_bookings(&ids)
                .await?
                .into_iter()
                .map(|a| (a.booking_id, a))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(bookings
            .into_iter()
            .map(|b| {
                let id = b.id;
                BookingDetails::new(b, details.remove(&id)).with_assignment(assignments.remove(&id))
            })
            .collect())
    }
}
