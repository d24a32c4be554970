//! Ride pricing and coupon application
//!
//! There is no routing engine behind quotes. Distance-priced rides draw their
//! distance from a `DistancePolicy` and rentals draw a package price from a
//! `PackagePricePolicy`; both are swappable so tests can pin them.

use chrono::Utc;
use rust_decimal::Decimal;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use zingcab_core::{
    config::PricingConfig,
    models::{CabType, CouponApplication, RideQuote},
    traits::CouponRepository,
    AppError, AppResult,
};

/// Kilometres between two locations
pub trait DistancePolicy: Send + Sync {
    fn distance_km(&self, pickup: &str, drop: &str) -> i32;
}

/// Price of a rental package with no drop location
pub trait PackagePricePolicy: Send + Sync {
    fn package_price(&self, pickup: &str, cab_type: CabType) -> Decimal;
}

/// Uniform draw from `[min, max)` kilometres
#[derive(Debug, Clone)]
pub struct RandomDistance {
    range: Range<i32>,
}

impl RandomDistance {
    pub fn new(min_km: i32, max_km: i32) -> Self {
        Self {
            range: min_km..max_km.max(min_km + 1),
        }
    }
}

impl DistancePolicy for RandomDistance {
    fn distance_km(&self, _pickup: &str, _drop: &str) -> i32 {
        rand::Rng::gen_range(&mut rand::thread_rng(), self.range.clone())
    }
}

/// Uniform draw of a whole-rupee price from `[min, max)`
#[derive(Debug, Clone)]
pub struct RandomPackagePrice {
    range: Range<i64>,
}

impl RandomPackagePrice {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            range: min..max.max(min + 1),
        }
    }
}

impl PackagePricePolicy for RandomPackagePrice {
    fn package_price(&self, _pickup: &str, _cab_type: CabType) -> Decimal {
        Decimal::from(rand::Rng::gen_range(
            &mut rand::thread_rng(),
            self.range.clone(),
        ))
    }
}

/// Always the same distance
#[derive(Debug, Clone, Copy)]
pub struct FixedDistance(pub i32);

impl DistancePolicy for FixedDistance {
    fn distance_km(&self, _pickup: &str, _drop: &str) -> i32 {
        self.0
    }
}

/// Always the same package price
#[derive(Debug, Clone, Copy)]
pub struct FixedPackagePrice(pub Decimal);

impl PackagePricePolicy for FixedPackagePrice {
    fn package_price(&self, _pickup: &str, _cab_type: CabType) -> Decimal {
        self.0
    }
}

/// Quotes rides and applies coupons
pub struct PricingEngine {
    coupons: Arc<dyn CouponRepository>,
    distance: Arc<dyn DistancePolicy>,
    package: Arc<dyn PackagePricePolicy>,
}

impl PricingEngine {
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        distance: Arc<dyn DistancePolicy>,
        package: Arc<dyn PackagePricePolicy>,
    ) -> Self {
        Self {
            coupons,
            distance,
            package,
        }
    }

    /// Random policies bounded by the `pricing` section
    pub fn from_config(coupons: Arc<dyn CouponRepository>, config: &PricingConfig) -> Self {
        Self::new(
            coupons,
            Arc::new(RandomDistance::new(
                config.min_distance_km,
                config.max_distance_km,
            )),
            Arc::new(RandomPackagePrice::new(
                config.min_package_price,
                config.max_package_price,
            )),
        )
    }

    /// Distance and price for a ride
    ///
    /// With a drop location: base + distance × per-km of the cab's rate row.
    /// Without one (rental): distance 0 and a package price. Unknown cab
    /// names use the Sedan row.
    pub fn quote(&self, pickup: &str, drop: Option<&str>, cab_type: &str) -> RideQuote {
        let cab = CabType::for_pricing(cab_type);
        if CabType::from_str(cab_type).is_none() {
            debug!("Unknown cab type {:?}, pricing as {}", cab_type, cab);
        }

        match drop.filter(|d| !d.trim().is_empty()) {
            Some(drop) => {
                let distance = self.distance.distance_km(pickup, drop);
                RideQuote {
                    distance,
                    price: cab.fare_for_distance(distance),
                }
            }
            None => RideQuote {
                distance: 0,
                price: self.package.package_price(pickup, cab),
            },
        }
    }

    /// Apply an optional coupon to a price
    ///
    /// No coupon leaves the price untouched. The discount is clamped to the
    /// price so the result is never negative.
    #[instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        coupon_id: Option<Uuid>,
        price: Decimal,
    ) -> AppResult<CouponApplication> {
        let Some(coupon_id) = coupon_id else {
            return Ok(CouponApplication::identity(price));
        };

        let coupon = self.coupons.find_by_id(coupon_id).await?.ok_or_else(|| {
            warn!("Coupon {} not found", coupon_id);
            AppError::CouponNotFound(coupon_id.to_string())
        })?;

        if coupon.is_expired_at(Utc::now()) {
            warn!("Coupon {} expired at {}", coupon_id, coupon.expiry_date);
            return Err(AppError::CouponExpired(coupon_id.to_string()));
        }

        let applied = coupon.apply_to(price);
        debug!(
            "Coupon {} applied: {} -> {} (discount {})",
            coupon_id, price, applied.final_price, applied.discount_amount
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use zingcab_core::models::Coupon;

    struct OneCoupon(Option<Coupon>);

    #[async_trait]
    impl CouponRepository for OneCoupon {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Coupon>> {
            Ok(self.0.clone().filter(|c| c.id == id))
        }
    }

    fn engine(coupon: Option<Coupon>) -> PricingEngine {
        PricingEngine::new(
            Arc::new(OneCoupon(coupon)),
            Arc::new(FixedDistance(100)),
            Arc::new(FixedPackagePrice(dec!(1500))),
        )
    }

    fn coupon(discount: Decimal, expires_in: Duration) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: Some("WELCOME".to_string()),
            discount_amount: discount,
            expiry_date: Utc::now() + expires_in,
        }
    }

    #[test]
    fn test_quote_rate_table() {
        let e = engine(None);
        assert_eq!(e.quote("A", Some("B"), "SUV").price, dec!(1215));
        assert_eq!(e.quote("A", Some("B"), "Sedan").price, dec!(1010));
        assert_eq!(e.quote("A", Some("B"), "Hatchback").price, dec!(808));
        assert_eq!(e.quote("A", Some("B"), "Sedan").distance, 100);
    }

    #[test]
    fn test_unknown_cab_prices_as_sedan() {
        let e = engine(None);
        assert_eq!(
            e.quote("A", Some("B"), "Limousine"),
            e.quote("A", Some("B"), "Sedan")
        );
        assert_eq!(
            e.quote("A", Some("B"), "suv"),
            e.quote("A", Some("B"), "Sedan")
        );
    }

    #[test]
    fn test_rental_quote_uses_package_price() {
        let q = engine(None).quote("A", None, "SUV");
        assert_eq!(q.distance, 0);
        assert_eq!(q.price, dec!(1500));
    }

    #[test]
    fn test_random_policies_stay_in_bounds() {
        let d = RandomDistance::new(50, 300);
        let p = RandomPackagePrice::new(1000, 3000);
        for _ in 0..500 {
            let km = d.distance_km("A", "B");
            assert!((50..300).contains(&km));
            let price = p.package_price("A", CabType::Sedan);
            assert!(price >= dec!(1000) && price < dec!(3000));
        }
    }

    #[tokio::test]
    async fn test_no_coupon_is_identity() {
        let applied = engine(None).apply_coupon(None, dec!(1010)).await.unwrap();
        assert_eq!(applied.final_price, dec!(1010));
        assert_eq!(applied.discount_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_coupon_discount_clamped() {
        let c = coupon(dec!(2000), Duration::days(1));
        let id = c.id;
        let applied = engine(Some(c)).apply_coupon(Some(id), dec!(1010)).await.unwrap();
        assert_eq!(applied.discount_amount, dec!(1010));
        assert_eq!(applied.final_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_coupon() {
        let result = engine(None).apply_coupon(Some(Uuid::new_v4()), dec!(100)).await;
        assert!(matches!(result, Err(AppError::CouponNotFound(_))));
    }

    #[tokio::test]
    async fn test_expired_coupon() {
        let c = coupon(dec!(50), Duration::days(-1));
        let id = c.id;
        let result = engine(Some(c)).apply_coupon(Some(id), dec!(100)).await;
        assert!(matches!(result, Err(AppError::CouponExpired(_))));
    }
}
