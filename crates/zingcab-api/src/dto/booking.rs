//! Booking DTOs
//!
//! One request type per ride type. Each validates its own fields and turns
//! into the engine's `RideRequest`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use zingcab_core::models::{RideRequest, RideType};

use super::common::{parse_coupon_id, validate_coupon_id, validate_pickup_time};

/// Price quote request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePriceRequest {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,

    pub drop_location: Option<String>,

    #[validate(length(min = 1, message = "Cab type is required"))]
    pub cab_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub coupon_id: Uuid,

    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RentalBookingRequest {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,

    #[validate(length(min = 1, message = "Rental package is required"))]
    pub rental_package: String,

    pub pickup_date: NaiveDate,

    #[validate(custom(function = "validate_pickup_time"))]
    pub pickup_time: String,

    #[validate(length(min = 1, message = "Cab type is required"))]
    pub cab_type: String,

    #[validate(custom(function = "validate_coupon_id"))]
    pub coupon_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AirportBookingRequest {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,

    #[validate(length(min = 1, message = "Drop location is required"))]
    pub drop_location: String,

    pub pickup_date: NaiveDate,

    #[validate(custom(function = "validate_pickup_time"))]
    pub pickup_time: String,

    #[validate(length(min = 1, message = "Cab type is required"))]
    pub cab_type: String,

    #[validate(custom(function = "validate_coupon_id"))]
    pub coupon_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OutstationBookingRequest {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,

    #[validate(length(min = 1, message = "Drop location is required"))]
    pub drop_location: String,

    pub pickup_date: NaiveDate,

    #[validate(custom(function = "validate_pickup_time"))]
    pub pickup_time: String,

    pub drop_off_date: NaiveDate,

    #[validate(length(min = 1, message = "Cab type is required"))]
    pub cab_type: String,

    #[validate(custom(function = "validate_coupon_id"))]
    pub coupon_id: Option<String>,
}

impl From<RentalBookingRequest> for RideRequest {
    fn from(req: RentalBookingRequest) -> Self {
        RideRequest {
            ride_type: RideType::Rental.to_string(),
            coupon_id: parse_coupon_id(req.coupon_id.as_deref()),
            pickup_location: req.pickup_location,
            drop_location: None,
            rental_package: Some(req.rental_package),
            pickup_date: req.pickup_date,
            pickup_time: req.pickup_time,
            drop_off_date: None,
            cab_type: req.cab_type,
        }
    }
}

impl From<AirportBookingRequest> for RideRequest {
    fn from(req: AirportBookingRequest) -> Self {
        RideRequest {
            ride_type: RideType::Airport.to_string(),
            coupon_id: parse_coupon_id(req.coupon_id.as_deref()),
            pickup_location: req.pickup_location,
            drop_location: Some(req.drop_location),
            rental_package: None,
            pickup_date: req.pickup_date,
            pickup_time: req.pickup_time,
            drop_off_date: None,
            cab_type: req.cab_type,
        }
    }
}

impl From<OutstationBookingRequest> for RideRequest {
    fn from(req: OutstationBookingRequest) -> Self {
        RideRequest {
            ride_type: RideType::Outstation.to_string(),
            coupon_id: parse_coupon_id(req.coupon_id.as_deref()),
            pickup_location: req.pickup_location,
            drop_location: Some(req.drop_location),
            rental_package: None,
            pickup_date: req.pickup_date,
            pickup_time: req.pickup_time,
            drop_off_date: Some(req.drop_off_date),
            cab_type: req.cab_type,
        }
    }
}
