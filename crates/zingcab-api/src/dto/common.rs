//! Common DTOs used across the API

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;
use validator::ValidationError;

/// Ten-digit local phone number
pub const PHONE_PATTERN: &str = r"^\d{10}$";

/// 24-hour `H:MM` or `HH:MM`
pub const PICKUP_TIME_PATTERN: &str = r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

static PICKUP_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PICKUP_TIME_PATTERN).expect("valid regex"));

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(rejected("phone", "Phone number must be 10 digits"))
    }
}

pub fn validate_pickup_time(value: &str) -> Result<(), ValidationError> {
    if PICKUP_TIME_RE.is_match(value) {
        Ok(())
    } else {
        Err(rejected("pickup_time", "Pickup time must be in HH:MM format"))
    }
}

/// A coupon id is either blank or a UUID
pub fn validate_coupon_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || Uuid::parse_str(value.trim()).is_ok() {
        Ok(())
    } else {
        Err(rejected("coupon_id", "Coupon ID must be a valid UUID"))
    }
}

/// Parse an already validated coupon id; blank means no coupon
pub fn parse_coupon_id(value: Option<&str>) -> Option<Uuid> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Uuid::parse_str(v).ok())
}

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success response carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Health check body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
