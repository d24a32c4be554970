//! Back-office records: fleet cars and contact-us queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Car in the operator's fleet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i32,

    /// Plate number, unique across the fleet
    pub registration_number: String,

    pub model: String,

    /// One of the priced cab types
    pub cab_type: String,

    pub assigned_driver_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Car registration payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub registration_number: String,
    pub model: String,
    pub cab_type: String,
}

/// Name and phone of the driver a car is assigned to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverContact {
    pub name: String,
    pub phone_number: String,
}

/// Fleet listing entry
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetCar {
    #[serde(flatten)]
    pub car: Car,

    pub driver: Option<DriverContact>,
}

/// Message left through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactQuery {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewContactQuery {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_car_flattens_car_fields() {
        let entry = FleetCar {
            car: Car {
                id: 3,
                registration_number: "KA01AB1234".to_string(),
                model: "Dzire".to_string(),
                cab_type: "Sedan".to_string(),
                assigned_driver_id: Some(7),
                created_at: Utc::now(),
            },
            driver: Some(DriverContact {
                name: "Ravi".to_string(),
                phone_number: "8888888888".to_string(),
            }),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["registrationNumber"], "KA01AB1234");
        assert_eq!(json["assignedDriverId"], 7);
        assert_eq!(json["driver"]["phoneNumber"], "8888888888");
    }
}
