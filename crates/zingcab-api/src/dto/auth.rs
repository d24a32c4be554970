//! Authentication DTOs
//!
//! Request and response types for rider, driver and admin sign-in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use zingcab_core::models::NewUser;

use super::common::validate_phone;

/// Code request for riders and drivers
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpResponse {
    pub is_new_user: bool,
}

/// Code check for riders and drivers
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

/// Rider sign-up, proven by a fresh code
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    pub gender: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub dob: Option<NaiveDate>,

    pub display_name: Option<String>,
}

impl RegisterRequest {
    /// Split into the account fields and the code
    pub fn into_parts(self) -> (NewUser, String) {
        let user = NewUser {
            name: self.name.trim().to_string(),
            phone_number: self.phone_number,
            gender: self.gender,
            email: self.email,
            dob: self.dob,
            display_name: self.display_name,
        };
        (user, self.otp)
    }
}

/// Admin sign-in
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
