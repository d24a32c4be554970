//! Booking lifecycle and dispatch engine for ZingCab
//!
//! # Services
//!
//! - `OtpService` - one-time codes over an injectable `CredentialStore`
//! - `PricingEngine` - ride quotes and coupon discounts
//! - `BookingOrchestrator` - booking creation and booking views
//! - `DispatchManager` - driver assignment
//! - `StatusSynchronizer` - driver actions and rider cancellation
//! - `AccountService` - rider, driver and admin sign-in, rider profiles
//! - `BackOfficeService` - fleet cars and contact-us queries
//! - `AuthThrottle` - sign-in attempt limits over an injectable `RateLimiter`
//!
//! Services hold their collaborators as `Arc<dyn Trait>` so the binary can
//! pick Postgres, Redis or in-memory implementations at startup.

pub mod accounts;
pub mod backoffice;
pub mod credential_store;
pub mod dispatch;
pub mod orchestrator;
pub mod otp;
pub mod pricing;
pub mod rate_limit;
pub mod sms;
pub mod status_sync;
pub mod writer;

pub use accounts::{AccountService, AdminSession, DriverSession, RiderSession, RiderVerification};
pub use backoffice::BackOfficeService;
pub use credential_store::InMemoryCredentialStore;
pub use dispatch::{AssignOutcome, DispatchManager, DriverRide};
pub use orchestrator::BookingOrchestrator;
pub use otp::{spawn_sweeper, OtpService};
pub use pricing::{
    DistancePolicy, FixedDistance, FixedPackagePrice, PackagePricePolicy, PricingEngine,
    RandomDistance, RandomPackagePrice,
};
pub use rate_limit::{AuthScope, AuthThrottle, InMemoryRateLimiter};
pub use sms::{LogSmsGateway, TwilioSmsGateway};
pub use status_sync::{StatusSynchronizer, SyncOutcome};
pub use writer::CompensatingBookingWriter;

/// Business logic constants
pub mod constants {
    /// Digits in a one-time code
    pub const OTP_LENGTH: usize = 6;

    /// SMS text preceding the code
    pub const OTP_MESSAGE_PREFIX: &str = "Your ZingCab verification code is: ";

    /// Page size for the admin booking list
    pub const DEFAULT_ADMIN_PAGE_SIZE: i64 = 50;
}
