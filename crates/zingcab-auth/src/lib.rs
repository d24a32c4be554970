//! Authentication and authorization for ZingCab
//!
//! Riders and drivers get tokens after a one-time code check; administrators
//! after an Argon2 password check. Every token carries the account id and
//! its role, and the request extractors enforce the role per route.
//!
//! # Examples
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use zingcab_auth::{AdminUser, RiderUser};
//!
//! async fn my_bookings(rider: RiderUser) -> HttpResponse {
//!     HttpResponse::Ok().json(serde_json::json!({ "userId": rider.id() }))
//! }
//!
//! async fn all_bookings(_admin: AdminUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::{JwtService, TokenLifetimes};
pub use middleware::{AdminUser, AuthenticatedUser, DriverUser, RiderUser};
pub use password::PasswordService;
