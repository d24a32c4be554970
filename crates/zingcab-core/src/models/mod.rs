//! Domain models for the ZingCab booking engine
//!
//! This module contains all the core domain models used throughout the application.

pub mod assignment;
pub mod booking;
pub mod credential;
pub mod fleet;
pub mod payment;
pub mod pricing;
pub mod user;

pub use assignment::{AssignmentStatus, DriverAction, DriverAssignment};
pub use booking::{
    AirportDetail, Booking, BookingDetails, BookingDraft, BookingStatus, OutstationDetail,
    RentalDetail, RideDetail, RideRequest, RideType,
};
pub use credential::{Credential, VerifyOutcome};
pub use fleet::{Car, ContactQuery, DriverContact, FleetCar, NewCar, NewContactQuery};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use pricing::{CabType, Coupon, CouponApplication, RideQuote};
pub use user::{Admin, Driver, NewDriver, NewUser, Role, User, UserUpdate};
