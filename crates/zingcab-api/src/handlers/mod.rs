//! HTTP request handlers

pub mod admin;
pub mod auth;
pub mod booking;
pub mod contact;
pub mod driver;
pub mod health;
pub mod user;

pub use admin::configure as configure_admin;
pub use auth::configure as configure_auth;
pub use booking::configure as configure_bookings;
pub use contact::configure as configure_contact;
pub use driver::configure as configure_drivers;
pub use health::configure as configure_health;
pub use user::configure as configure_users;

use actix_web::web;
use tracing::warn;
use validator::Validate;
use zingcab_core::{AppError, AppResult};

/// Unwrap a JSON body after running its field validators
pub(crate) fn validated<T: Validate>(body: web::Json<T>, what: &str) -> AppResult<T> {
    let body = body.into_inner();
    body.validate().map_err(|e| {
        warn!("{} validation failed: {}", what, e);
        AppError::from(e)
    })?;
    Ok(body)
}
