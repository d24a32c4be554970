//! Account models: riders, drivers and administrators
//!
//! Riders and drivers authenticate with one-time codes sent to their phone;
//! administrators log in with email and password.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor role carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Rider booking trips
    #[default]
    User,
    /// Driver fulfilling assigned trips
    Driver,
    /// Back-office operator
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Driver => write!(f, "driver"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl Role {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "driver" => Some(Role::Driver),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, Role::Driver)
    }
}

/// Rider account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,

    /// Ten-digit local phone number, unique
    pub phone_number: String,

    pub gender: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rider registration payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub phone_number: String,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub display_name: Option<String>,
}

/// Rider profile changes; absent fields keep their value
///
/// The phone number is the sign-in identity and is not part of an update.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub display_name: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.email.is_none()
            && self.dob.is_none()
            && self.display_name.is_none()
    }

    /// Apply onto an in-memory copy of the account
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(gender) = &self.gender {
            user.gender = Some(gender.clone());
        }
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
        if let Some(dob) = self.dob {
            user.dob = Some(dob);
        }
        if let Some(display_name) = &self.display_name {
            user.display_name = Some(display_name.clone());
        }
    }
}

/// Driver account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub driving_license: String,
    pub created_at: DateTime<Utc>,
}

/// Driver registration payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub name: String,
    pub phone_number: String,
    pub driving_license: String,
}

/// Administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i32,
    pub email: String,

    /// Password hash (never expose in API responses)
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}
