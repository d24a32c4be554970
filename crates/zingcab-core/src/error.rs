//! Unified error handling for the ZingCab booking engine
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Cache Errors ====================
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Cache connection failed: {0}")]
    CacheConnection(String),

    // ==================== Authentication Errors ====================
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Too many login attempts, please try again later.")]
    RateLimited(String),

    // ==================== One-time Code Errors ====================
    #[error("OTP not found or expired")]
    CredentialNotFound,

    #[error("OTP expired")]
    CredentialExpired,

    #[error("Invalid OTP")]
    CredentialMismatch,

    // ==================== Booking Errors ====================
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Invalid ride type: {0}")]
    InvalidRideType(String),

    #[error("Failed to create ride details")]
    RideDetailCreationFailed(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    InvalidTransition(String),

    // ==================== Dispatch Errors ====================
    #[error("Driver booking not found: {0}")]
    AssignmentNotFound(String),

    #[error("Error checking booking assignment status")]
    AssignmentLookupFailed(String),

    // ==================== Pricing Errors ====================
    #[error("Invalid coupon")]
    CouponNotFound(String),

    #[error("Coupon expired")]
    CouponExpired(String),

    // ==================== Account Errors ====================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation Error")]
    InvalidFields(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ==================== External Service Errors ====================
    #[error("SMS delivery failed: {0}")]
    Sms(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidFields(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::InvalidRideType(_)
            | AppError::CredentialNotFound
            | AppError::CredentialExpired
            | AppError::CredentialMismatch
            | AppError::CouponNotFound(_)
            | AppError::CouponExpired(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidCredentials
            | AppError::InvalidToken(_)
            | AppError::TokenExpired
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden | AppError::NotAuthorized(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::BookingNotFound(_)
            | AppError::AssignmentNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::DriverNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_) | AppError::InvalidTransition(_) => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway
            AppError::Sms(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Cache(_) => "cache_error",
            AppError::CacheConnection(_) => "cache_connection_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::RateLimited(_) => "rate_limited",
            AppError::CredentialNotFound => "otp_not_found",
            AppError::CredentialExpired => "otp_expired",
            AppError::CredentialMismatch => "otp_mismatch",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::InvalidRideType(_) => "invalid_ride_type",
            AppError::RideDetailCreationFailed(_) => "ride_detail_creation_failed",
            AppError::NotAuthorized(_) => "not_authorized",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::AssignmentNotFound(_) => "assignment_not_found",
            AppError::AssignmentLookupFailed(_) => "assignment_lookup_failed",
            AppError::CouponNotFound(_) => "coupon_not_found",
            AppError::CouponExpired(_) => "coupon_expired",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::DriverNotFound(_) => "driver_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidFields(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Sms(_) => "sms_error",
        }
    }

    /// Message safe to show to callers
    ///
    /// Store and infrastructure failures are reported generically; their
    /// detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Transaction(_)
            | AppError::Cache(_)
            | AppError::CacheConnection(_)
            | AppError::PasswordHash(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => "Internal server error".to_string(),
            AppError::Sms(_) => "Failed to send OTP".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = json!({
            "success": false,
            "error": self.error_code(),
            "message": self.public_message(),
            "status": status.as_u16(),
        });

        if let AppError::InvalidFields(errors) = self {
            body["errors"] = json!(errors);
        }

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::InvalidFields(messages)
    }
}
