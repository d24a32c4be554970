//! Data Transfer Objects (DTOs) for API requests and responses

pub mod admin;
pub mod auth;
pub mod backoffice;
pub mod booking;
pub mod common;

pub use admin::*;
pub use auth::*;
pub use backoffice::*;
pub use booking::*;
pub use common::*;
