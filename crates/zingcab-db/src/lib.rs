//! ZingCab Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the ZingCab booking engine. It includes:
//!
//! - Connection pool management and migrations with sqlx
//! - Repository implementations for bookings, ride details, assignments,
//!   payments, coupons, accounts, fleet cars and contact queries
//! - A transactional `BookingWriter`

pub mod booking_writer;
pub mod pool;
pub mod repositories;

pub use booking_writer::PgTransactionalBookingWriter;
pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use zingcab_core::{AppError, AppResult};
