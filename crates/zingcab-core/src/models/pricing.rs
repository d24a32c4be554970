//! Pricing models: cab rate table, quotes and coupons

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cab category with its own rate row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CabType {
    #[serde(rename = "SUV")]
    Suv,
    #[default]
    Sedan,
    Hatchback,
}

impl fmt::Display for CabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CabType::Suv => write!(f, "SUV"),
            CabType::Sedan => write!(f, "Sedan"),
            CabType::Hatchback => write!(f, "Hatchback"),
        }
    }
}

impl CabType {
    /// Exact-name lookup
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUV" => Some(CabType::Suv),
            "Sedan" => Some(CabType::Sedan),
            "Hatchback" => Some(CabType::Hatchback),
            _ => None,
        }
    }

    /// Rate row used for pricing; unrecognised names price as Sedan
    pub fn for_pricing(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Flat base fare
    pub fn base_price(&self) -> Decimal {
        match self {
            CabType::Suv => Decimal::from(15),
            CabType::Sedan => Decimal::from(10),
            CabType::Hatchback => Decimal::from(8),
        }
    }

    /// Fare per kilometre
    pub fn per_km_rate(&self) -> Decimal {
        match self {
            CabType::Suv => Decimal::from(12),
            CabType::Sedan => Decimal::from(10),
            CabType::Hatchback => Decimal::from(8),
        }
    }

    /// base + distance × per-km
    pub fn fare_for_distance(&self, distance_km: i32) -> Decimal {
        self.base_price() + Decimal::from(distance_km) * self.per_km_rate()
    }
}

/// Transient price quote, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideQuote {
    /// Distance in kilometres (0 for rentals)
    pub distance: i32,
    pub price: Decimal,
}

/// Discount coupon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,

    /// Human-facing code, if the coupon has one
    pub code: Option<String>,

    /// Flat discount amount
    pub discount_amount: Decimal,

    pub expiry_date: DateTime<Utc>,
}

impl Coupon {
    /// Check expiry against a given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }

    /// Apply this coupon to a price, clamping the discount to the price
    pub fn apply_to(&self, price: Decimal) -> CouponApplication {
        CouponApplication::clamped(price, self.discount_amount)
    }
}

/// Result of applying a coupon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponApplication {
    pub final_price: Decimal,
    pub discount_amount: Decimal,
}

impl CouponApplication {
    /// No coupon: price unchanged, zero discount
    pub fn identity(price: Decimal) -> Self {
        Self {
            final_price: price,
            discount_amount: Decimal::ZERO,
        }
    }

    /// discount = min(discount, price), final = price - discount
    pub fn clamped(price: Decimal, discount: Decimal) -> Self {
        let discount_amount = discount.min(price).max(Decimal::ZERO);
        Self {
            final_price: price - discount_amount,
            discount_amount,
        }
    }
}
