//! Fleet, contact form and rider profile DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;
use zingcab_core::models::{NewCar, NewContactQuery, UserUpdate};

use super::common::validate_phone;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[validate(length(min = 1, max = 16, message = "Registration number is required"))]
    pub registration_number: String,

    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: String,

    #[validate(length(min = 1, message = "Cab type is required"))]
    pub cab_type: String,
}

impl From<CreateCarRequest> for NewCar {
    fn from(req: CreateCarRequest) -> Self {
        NewCar {
            registration_number: req.registration_number.trim().to_uppercase(),
            model: req.model.trim().to_string(),
            cab_type: req.cab_type.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignCarRequest {
    #[validate(range(min = 1, message = "Car ID must be positive"))]
    pub car_id: i32,

    #[validate(range(min = 1, message = "Driver ID must be positive"))]
    pub driver_id: i32,
}

/// Public contact form
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
}

impl From<ContactRequest> for NewContactQuery {
    fn from(req: ContactRequest) -> Self {
        NewContactQuery {
            name: req.name.trim().to_string(),
            phone_number: req.phone_number,
            email: req.email.trim().to_string(),
            message: req.message.trim().to_string(),
        }
    }
}

/// `PUT /users/profile`; a `phoneNumber` in the body is ignored
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,

    pub gender: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub dob: Option<NaiveDate>,

    #[validate(length(max = 100, message = "Display name is too long"))]
    pub display_name: Option<String>,
}

impl From<UpdateProfileRequest> for UserUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        UserUpdate {
            name: req.name.map(|n| n.trim().to_string()),
            gender: req.gender,
            email: req.email,
            dob: req.dob,
            display_name: req.display_name,
        }
    }
}
