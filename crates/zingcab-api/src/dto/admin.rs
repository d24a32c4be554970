//! Admin and driver DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use zingcab_core::models::{AssignmentStatus, BookingStatus, NewDriver};
use zingcab_core::traits::Pagination;
use zingcab_core::AppError;
use zingcab_services::constants::DEFAULT_ADMIN_PAGE_SIZE;

use super::common::validate_phone;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub booking_id: Uuid,

    #[validate(range(min = 1, message = "Driver ID must be positive"))]
    pub driver_id: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(length(min = 1, max = 50, message = "Driving license is required"))]
    pub driving_license: String,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(req: CreateDriverRequest) -> Self {
        NewDriver {
            name: req.name.trim().to_string(),
            phone_number: req.phone_number,
            driving_license: req.driving_license.trim().to_string(),
        }
    }
}

/// `GET /admin/bookings` query
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingListQuery {
    pub status: Option<String>,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200, message = "Limit must be between 1 and 200"))]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_ADMIN_PAGE_SIZE
}

impl BookingListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    /// Status filter; blank means all
    pub fn status_filter(&self) -> Result<Option<BookingStatus>, AppError> {
        parse_filter(self.status.as_deref(), BookingStatus::from_str)
    }
}

/// `GET /drivers/bookings` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverRidesQuery {
    pub status: Option<String>,
}

impl DriverRidesQuery {
    pub fn status_filter(&self) -> Result<Option<AssignmentStatus>, AppError> {
        parse_filter(self.status.as_deref(), AssignmentStatus::from_str)
    }
}

fn parse_filter<T>(raw: Option<&str>, parse: fn(&str) -> Option<T>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse(s)
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown status: {}", s))),
    }
}
