//! Driver assignment model
//!
//! Binds a driver to a booking. The assignment carries its own sub-status,
//! which the status synchronizer mirrors onto the parent booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::booking::BookingStatus;

/// Driver assignment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    #[default]
    Assigned,
    InProgress,
    Completed,
    NoShow,
    Cancelled,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Assigned => write!(f, "ASSIGNED"),
            AssignmentStatus::InProgress => write!(f, "IN_PROGRESS"),
            AssignmentStatus::Completed => write!(f, "COMPLETED"),
            AssignmentStatus::NoShow => write!(f, "NO_SHOW"),
            AssignmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl AssignmentStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ASSIGNED" => Some(AssignmentStatus::Assigned),
            "IN_PROGRESS" => Some(AssignmentStatus::InProgress),
            "COMPLETED" => Some(AssignmentStatus::Completed),
            "NO_SHOW" => Some(AssignmentStatus::NoShow),
            "CANCELLED" => Some(AssignmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Explicit transition table
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;

        match (self, next) {
            (Assigned, InProgress) => true,
            (InProgress, Completed) => true,
            (Assigned | InProgress, NoShow) => true,
            (Assigned | InProgress, Cancelled) => true,
            _ => false,
        }
    }

    /// Booking status kept in lockstep with this assignment status
    pub fn booking_status(&self) -> BookingStatus {
        match self {
            AssignmentStatus::Assigned => BookingStatus::DriverAssigned,
            AssignmentStatus::InProgress => BookingStatus::InProgress,
            AssignmentStatus::Completed => BookingStatus::Completed,
            AssignmentStatus::NoShow => BookingStatus::NoShow,
            AssignmentStatus::Cancelled => BookingStatus::Cancelled,
        }
    }
}

/// Driver-initiated ride action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriverAction {
    Start,
    Complete,
    NoShow,
}

impl fmt::Display for DriverAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverAction::Start => write!(f, "start"),
            DriverAction::Complete => write!(f, "complete"),
            DriverAction::NoShow => write!(f, "noShow"),
        }
    }
}

impl DriverAction {
    /// Parse from string, accepting both `noShow` and `no-show`
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "start" => Some(DriverAction::Start),
            "complete" => Some(DriverAction::Complete),
            "noshow" => Some(DriverAction::NoShow),
            _ => None,
        }
    }

    /// Status the action moves the assignment to
    pub fn target_status(&self) -> AssignmentStatus {
        match self {
            DriverAction::Start => AssignmentStatus::InProgress,
            DriverAction::Complete => AssignmentStatus::Completed,
            DriverAction::NoShow => AssignmentStatus::NoShow,
        }
    }
}

/// Driver assignment record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverAssignment {
    /// Unique identifier (the "driver booking" id drivers act on)
    pub id: Uuid,

    pub booking_id: Uuid,
    pub driver_id: i32,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DriverAssignment {
    /// Create a fresh assignment in `ASSIGNED` state
    pub fn new(booking_id: Uuid, driver_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            driver_id,
            status: AssignmentStatus::Assigned,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_held_by(&self, driver_id: i32) -> bool {
        self.driver_id == driver_id
    }
}
