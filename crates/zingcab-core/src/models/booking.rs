//! Booking and ride detail models
//!
//! A booking is the canonical ride record. It owns exactly one ride detail,
//! chosen by its ride type at creation time, and at most one driver assignment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::assignment::DriverAssignment;
use crate::error::AppError;

/// Ride type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideType {
    /// Hourly package ride with no fixed destination
    Rental,
    /// Transfer to or from an airport
    Airport,
    /// Intercity ride with a return date
    Outstation,
}

impl fmt::Display for RideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RideType::Rental => write!(f, "rental"),
            RideType::Airport => write!(f, "airport"),
            RideType::Outstation => write!(f, "outstation"),
        }
    }
}

impl RideType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rental" => Some(RideType::Rental),
            "airport" => Some(RideType::Airport),
            "outstation" => Some(RideType::Outstation),
            _ => None,
        }
    }

    /// Whether rides of this type are priced by distance
    pub fn needs_drop_location(&self) -> bool {
        !matches!(self, RideType::Rental)
    }
}

/// Booking status
///
/// ```text
/// PENDING -> DRIVER_ASSIGNED -> IN_PROGRESS -> COMPLETED
///    |             |                |
///    +-------------+----------------+--> CANCELLED
///                  |                |
///                  +----------------+--> NO_SHOW
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    DriverAssigned,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "PENDING"),
            BookingStatus::DriverAssigned => write!(f, "DRIVER_ASSIGNED"),
            BookingStatus::InProgress => write!(f, "IN_PROGRESS"),
            BookingStatus::Completed => write!(f, "COMPLETED"),
            BookingStatus::Cancelled => write!(f, "CANCELLED"),
            BookingStatus::NoShow => write!(f, "NO_SHOW"),
        }
    }
}

impl BookingStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "DRIVER_ASSIGNED" => Some(BookingStatus::DriverAssigned),
            "IN_PROGRESS" => Some(BookingStatus::InProgress),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "NO_SHOW" => Some(BookingStatus::NoShow),
            _ => None,
        }
    }

    /// Check if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    /// Rider cancellation is refused only once the ride completed or was already cancelled
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Explicit transition table
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        match (self, next) {
            (Pending, DriverAssigned) => true,
            (DriverAssigned, DriverAssigned) => true,
            (DriverAssigned, InProgress) => true,
            (InProgress, Completed) => true,
            (DriverAssigned | InProgress, NoShow) => true,
            (Pending | DriverAssigned | InProgress, Cancelled) => true,
            _ => false,
        }
    }

    /// Whether `target` is this status or lies ahead of it in the table
    ///
    /// A booking whose mirror write lagged may still catch up; a terminal or
    /// further advanced booking may not be moved.
    pub fn can_reach(&self, target: BookingStatus) -> bool {
        if *self == target {
            return true;
        }
        Self::ALL
            .iter()
            .any(|&next| next != *self && self.can_transition_to(next) && next.can_reach(target))
    }

    const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::DriverAssigned,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::NoShow,
    ];
}

/// Base booking record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,

    /// Rider who owns the booking
    pub user_id: i32,

    /// Discriminator for the ride detail record
    pub ride_type: RideType,

    /// Distance in kilometres (0 for rentals)
    pub distance: i32,

    /// Final price after any coupon discount
    pub price: Decimal,

    /// Applied coupon, if any
    pub coupon_id: Option<Uuid>,

    /// Current lifecycle status
    pub status: BookingStatus,

    /// Linked payment placeholder (absent if it could not be created)
    pub payment_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a new pending booking from a draft
    pub fn pending(user_id: i32, ride_type: RideType, draft: &BookingDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            ride_type,
            distance: draft.distance,
            price: draft.final_price,
            coupon_id: draft.ride.coupon_id,
            status: BookingStatus::Pending,
            payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the booking belongs to the given rider
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// Rental ride fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RentalDetail {
    pub pickup_location: String,
    pub rental_package: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub cab_type: String,
}

/// Airport ride fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AirportDetail {
    pub pickup_location: String,
    pub drop_location: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub cab_type: String,
}

/// Outstation ride fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutstationDetail {
    pub pickup_location: String,
    pub drop_location: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub cab_type: String,
    pub drop_off_date: NaiveDate,
}

/// Ride-type-specific detail, one variant per booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rideType", rename_all = "lowercase")]
pub enum RideDetail {
    Rental(RentalDetail),
    Airport(AirportDetail),
    Outstation(OutstationDetail),
}

impl RideDetail {
    /// Ride type tag of this variant
    pub fn ride_type(&self) -> RideType {
        match self {
            RideDetail::Rental(_) => RideType::Rental,
            RideDetail::Airport(_) => RideType::Airport,
            RideDetail::Outstation(_) => RideType::Outstation,
        }
    }

    pub fn drop_location(&self) -> Option<&str> {
        match self {
            RideDetail::Rental(_) => None,
            RideDetail::Airport(d) => Some(&d.drop_location),
            RideDetail::Outstation(d) => Some(&d.drop_location),
        }
    }

    /// Build the variant selected by the request's ride type tag
    ///
    /// Unknown tags fail with `InvalidRideType`; a known tag with a missing
    /// variant field fails with `MissingField`. Nothing is written either way.
    pub fn from_request(req: &RideRequest) -> Result<Self, AppError> {
        let ride_type = RideType::from_str(&req.ride_type)
            .ok_or_else(|| AppError::InvalidRideType(req.ride_type.clone()))?;

        let detail = match ride_type {
            RideType::Rental => RideDetail::Rental(RentalDetail {
                pickup_location: req.pickup_location.clone(),
                rental_package: required(&req.rental_package, "rentalPackage")?,
                pickup_date: req.pickup_date,
                pickup_time: req.pickup_time.clone(),
                cab_type: req.cab_type.clone(),
            }),
            RideType::Airport => RideDetail::Airport(AirportDetail {
                pickup_location: req.pickup_location.clone(),
                drop_location: required(&req.drop_location, "dropLocation")?,
                pickup_date: req.pickup_date,
                pickup_time: req.pickup_time.clone(),
                cab_type: req.cab_type.clone(),
            }),
            RideType::Outstation => RideDetail::Outstation(OutstationDetail {
                pickup_location: req.pickup_location.clone(),
                drop_location: required(&req.drop_location, "dropLocation")?,
                pickup_date: req.pickup_date,
                pickup_time: req.pickup_time.clone(),
                cab_type: req.cab_type.clone(),
                drop_off_date: req
                    .drop_off_date
                    .ok_or_else(|| AppError::MissingField("dropOffDate".to_string()))?,
            }),
        };

        Ok(detail)
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::MissingField(field.to_string())),
    }
}

/// Caller's ride parameters, before pricing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    /// Ride type tag as received ("rental", "airport", "outstation")
    pub ride_type: String,
    pub pickup_location: String,
    pub drop_location: Option<String>,
    pub rental_package: Option<String>,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub drop_off_date: Option<NaiveDate>,
    pub cab_type: String,
    pub coupon_id: Option<Uuid>,
}

/// Priced ride ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub ride: RideRequest,
    pub distance: i32,
    pub final_price: Decimal,
}

/// Booking joined with its ride detail and driver assignment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,

    /// Ride detail (absent only if the detail row is missing)
    pub ride_detail: Option<RideDetail>,

    /// Current driver assignment, if a driver was dispatched
    pub assignment: Option<DriverAssignment>,
}

impl BookingDetails {
    pub fn new(booking: Booking, ride_detail: Option<RideDetail>) -> Self {
        Self {
            booking,
            ride_detail,
            assignment: None,
        }
    }

    pub fn with_assignment(mut self, assignment: Option<DriverAssignment>) -> Self {
        self.assignment = assignment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_can_reach_follows_table_forward_only() {
        use BookingStatus::*;

        assert!(Pending.can_reach(InProgress));
        assert!(Pending.can_reach(Completed));
        assert!(InProgress.can_reach(InProgress));
        assert!(!InProgress.can_reach(DriverAssigned));
        assert!(!Cancelled.can_reach(InProgress));
        assert!(!Cancelled.can_reach(Completed));
        assert!(!Completed.can_reach(NoShow));
        assert!(NoShow.can_reach(NoShow));
    }

    fn request(ride_type: &str) -> RideRequest {
        RideRequest {
            ride_type: ride_type.to_string(),
            pickup_location: "A".to_string(),
            drop_location: Some("B".to_string()),
            rental_package: None,
            pickup_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            pickup_time: "09:30".to_string(),
            drop_off_date: None,
            cab_type: "Sedan".to_string(),
            coupon_id: None,
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::DriverAssigned,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_transition_table() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(DriverAssigned));
        assert!(DriverAssigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(NoShow));
        assert!(Pending.can_transition_to(Cancelled));

        assert!(!Completed.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(DriverAssigned));
        assert!(!Pending.can_transition_to(NoShow));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!NoShow.can_transition_to(Cancelled));
    }

    #[test]
    fn test_cancellable() {
        assert!(BookingStatus::Pending.is_cancellable());
        assert!(BookingStatus::InProgress.is_cancellable());
        assert!(!BookingStatus::Completed.is_cancellable());
        assert!(!BookingStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_ride_detail_from_request() {
        let detail = RideDetail::from_request(&request("airport")).unwrap();
        assert_eq!(detail.ride_type(), RideType::Airport);
        assert_eq!(detail.drop_location(), Some("B"));

        let mut rental = request("Rental");
        rental.rental_package = Some("4hr/40km".to_string());
        let detail = RideDetail::from_request(&rental).unwrap();
        assert_eq!(detail.ride_type(), RideType::Rental);
        assert_eq!(detail.drop_location(), None);
    }

    #[test]
    fn test_ride_detail_rejects_unknown_type() {
        let err = RideDetail::from_request(&request("helicopter")).unwrap_err();
        assert!(matches!(err, AppError::InvalidRideType(t) if t == "helicopter"));
    }

    #[test]
    fn test_outstation_requires_drop_off_date() {
        let err = RideDetail::from_request(&request("outstation")).unwrap_err();
        assert!(matches!(err, AppError::MissingField(f) if f == "dropOffDate"));
    }

    #[test]
    fn test_ride_detail_serializes_with_tag() {
        let detail = RideDetail::from_request(&request("airport")).unwrap();
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["rideType"], "airport");
        assert_eq!(json["dropLocation"], "B");
    }

    #[test]
    fn test_pending_booking_takes_draft_price() {
        let draft = BookingDraft {
            ride: request("airport"),
            distance: 120,
            final_price: dec!(1210),
        };
        let booking = Booking::pending(42, RideType::Airport, &draft);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.price, dec!(1210));
        assert!(booking.payment_id.is_none());
        assert!(booking.is_owned_by(42));
        assert!(!booking.is_owned_by(7));
    }
}
