//! Common traits for repositories and collaborators
//!
//! The engine talks to the record store, the credential store and the SMS
//! gateway only through these seams. Repositories return `Ok(None)` for
//! "no row found" and reserve `Err` for real store failures.

use crate::error::AppError;
use crate::models::{
    AssignmentStatus, Admin, Booking, BookingStatus, Car, ContactQuery, Coupon, Credential,
    Driver, DriverAssignment, FleetCar, NewCar, NewContactQuery, NewDriver, NewUser, Payment,
    RideDetail, RideType, User, UserUpdate, VerifyOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Base booking rows
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking row
    async fn insert(&self, booking: &Booking) -> Result<Booking, AppError>;

    /// Find booking by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Set status and refresh `updated_at`; returns false if no row matched
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<bool, AppError>;

    /// Link a payment record
    async fn set_payment(&self, id: Uuid, payment_id: Uuid) -> Result<(), AppError>;

    /// Delete booking by ID (used for compensation)
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// A rider's bookings, newest first
    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Booking>, AppError>;

    /// All bookings with optional status filter, newest first
    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;
}

/// Ride-type detail rows, one table per variant
#[async_trait]
pub trait RideDetailRepository: Send + Sync {
    /// Insert the detail variant for a booking
    async fn insert(&self, booking_id: Uuid, detail: &RideDetail) -> Result<(), AppError>;

    /// Find the detail of the given type for a booking
    async fn find_by_booking(
        &self,
        booking_id: Uuid,
        ride_type: RideType,
    ) -> Result<Option<RideDetail>, AppError>;

    /// Batch lookup keyed by booking id
    async fn find_for_bookings(
        &self,
        booking_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, RideDetail)>, AppError>;
}

/// Payment placeholders
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<Payment, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError>;
}

/// Driver assignments ("driver bookings")
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriverAssignment>, AppError>;

    /// Current assignment of a booking, if any
    async fn find_by_booking(&self, booking_id: Uuid)
        -> Result<Option<DriverAssignment>, AppError>;

    /// Insert a new assignment; if the booking already has one, overwrite its
    /// driver and reset it to `ASSIGNED` instead. Returns the stored row and
    /// whether it was newly created.
    async fn upsert(
        &self,
        assignment: &DriverAssignment,
    ) -> Result<(DriverAssignment, bool), AppError>;

    /// Overwrite the driver, reset status to `ASSIGNED`, refresh `updated_at`
    async fn reassign(&self, id: Uuid, driver_id: i32) -> Result<DriverAssignment, AppError>;

    /// Set status on one assignment
    async fn update_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<DriverAssignment, AppError>;

    /// Set status on whatever assignment a booking has; returns rows touched
    async fn update_status_by_booking(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<u64, AppError>;

    /// A driver's assignments, newest first, optionally filtered by status
    async fn list_by_driver(
        &self,
        driver_id: i32,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<DriverAssignment>, AppError>;

    /// Batch lookup by booking ids
    async fn find_for_bookings(
        &self,
        booking_ids: &[Uuid],
    ) -> Result<Vec<DriverAssignment>, AppError>;
}

/// Read-only coupon catalogue
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, AppError>;
}

/// Rider accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Create a rider; a duplicate phone number fails with `Conflict`
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    /// Apply the provided fields; `None` if no such rider
    async fn update(&self, id: i32, update: &UserUpdate) -> Result<Option<User>, AppError>;

    /// Delete the rider together with their bookings and payments
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

/// Driver accounts
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Driver>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Driver>, AppError>;

    /// Create a driver; a duplicate phone number fails with `Conflict`
    async fn create(&self, driver: &NewDriver) -> Result<Driver, AppError>;

    async fn list_all(&self) -> Result<Vec<Driver>, AppError>;
}

/// Fleet cars
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Register a car; a duplicate registration number fails with `Conflict`
    async fn create(&self, car: &NewCar) -> Result<Car, AppError>;

    /// Every car with its driver's contact, newest first
    async fn list_all(&self) -> Result<Vec<FleetCar>, AppError>;

    /// Point a car at a driver; `None` if no such car
    async fn assign_driver(&self, car_id: i32, driver_id: i32) -> Result<Option<Car>, AppError>;
}

/// Contact-us messages
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, query: &NewContactQuery) -> Result<ContactQuery, AppError>;

    /// Newest first
    async fn list_all(&self) -> Result<Vec<ContactQuery>, AppError>;
}

/// Administrator accounts
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;
}

/// Store for one-time credentials keyed by phone number
///
/// Implementations must make `verify` atomic per phone number: the
/// expiry/match check and the delete happen as one step, so two concurrent
/// verifications of the same credential cannot both succeed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or overwrite the credential for its phone number
    async fn put(&self, credential: Credential) -> Result<(), AppError>;

    /// Check a code; consumes on success, removes on expiry, keeps on mismatch
    async fn verify(
        &self,
        phone_number: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, AppError>;

    /// Drop every credential expired at `now`; returns how many were removed
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError>;
}

/// Sliding-window attempt counter
///
/// `check_and_record` must count and record as one step so concurrent
/// attempts cannot both slip under the limit.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record an attempt under `key`
    ///
    /// Fails with `RateLimited` when `max_attempts` were already recorded
    /// inside `window`. Rejected attempts still count.
    async fn check_and_record(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> Result<(), AppError>;
}

/// Outbound SMS delivery
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `message` to a full international number
    async fn send(&self, to: &str, message: &str) -> Result<(), AppError>;
}

/// What a booking write produced
#[derive(Debug, Clone)]
pub struct WriteReceipt {
    /// Booking as stored, with `payment_id` set if the payment was linked
    pub booking: Booking,

    /// Ride detail as stored
    pub ride_detail: RideDetail,

    /// Payment placeholder, absent if its creation failed
    pub payment: Option<Payment>,
}

/// Strategy persisting a booking, its ride detail and its payment placeholder
///
/// Booking and detail are all-or-nothing; the payment is a soft dependency.
#[async_trait]
pub trait BookingWriter: Send + Sync {
    async fn write(&self, booking: Booking, detail: RideDetail) -> Result<WriteReceipt, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 200),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 50);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 50);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 5000);
        assert_eq!(p.per_page, 200);
    }

    #[test]
    fn test_pagination_meta() {
        assert_eq!(PaginationMeta::new(95, 1, 10).total_pages, 10);
        assert_eq!(PaginationMeta::new(101, 1, 10).total_pages, 11);
        assert_eq!(PaginationMeta::new(0, 1, 50).total_pages, 0);
    }
}
