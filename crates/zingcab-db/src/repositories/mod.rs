//! Repository implementations
//!
//! This module contains concrete implementations of the repository traits
//! defined in zingcab-core, using sqlx for PostgreSQL access.

pub mod admin_repo;
pub mod assignment_repo;
pub mod booking_repo;
pub mod car_repo;
pub mod contact_repo;
pub mod coupon_repo;
pub mod driver_repo;
pub mod payment_repo;
pub mod ride_detail_repo;
pub mod user_repo;

pub use admin_repo::PgAdminRepository;
pub use assignment_repo::PgAssignmentRepository;
pub use booking_repo::PgBookingRepository;
pub use car_repo::PgCarRepository;
pub use contact_repo::PgContactRepository;
pub use coupon_repo::PgCouponRepository;
pub use driver_repo::PgDriverRepository;
pub use payment_repo::PgPaymentRepository;
pub use ride_detail_repo::PgRideDetailRepository;
pub use user_repo::PgUserRepository;
