//! ZingCab Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the ZingCab booking engine. It includes:
//!
//! - Domain models (Booking, RideDetail, DriverAssignment, Coupon, etc.)
//! - Repository and collaborator traits the services are generic over
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
