//! API layer for ZingCab
//!
//! HTTP handlers for rider sign-in, bookings, driver actions, the contact
//! form and administration. Every response uses the `{success, message, data}`
//! envelope; errors come from `AppError`'s `ResponseError` impl.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod state;

pub use dto::ApiResponse;
pub use handlers::{
    configure_admin, configure_auth, configure_bookings, configure_contact, configure_drivers,
    configure_health, configure_users,
};
pub use state::AppState;

use actix_web::{error::InternalError, web, ResponseError};
use zingcab_core::AppError;

/// Mount every route under `/api`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(configure_health)
            .configure(configure_auth)
            .configure(configure_bookings)
            .configure(configure_users)
            .configure(configure_drivers)
            .configure(configure_contact)
            .configure(configure_admin),
    );
}

/// JSON bodies that fail to parse answer with the error envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let response = AppError::Validation(err.to_string()).error_response();
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = AppError::InvalidInput(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}

/// Malformed ids in the path are a 400, not a 404
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = AppError::InvalidInput(format!("Invalid path parameter: {}", err)).error_response();
        InternalError::from_response(err, response).into()
    })
}
