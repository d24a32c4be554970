//! Booking creation: all-or-nothing core rows, soft payment, best-effort re-read

mod common;

use common::*;
use chrono::Duration;
use rust_decimal_macros::dec;
use zingcab_core::models::{BookingStatus, RideDetail, RideType};
use zingcab_core::traits::Pagination;
use zingcab_core::AppError;

#[tokio::test]
async fn test_airport_booking_creates_all_rows() {
    let h = Harness::new();

    let details = h
        .orchestrator
        .create_booking(draft(airport_ride("A", "B", "Sedan"), 120, dec!(1210)), 42)
        .await
        .unwrap();

    let booking = &details.booking;
    assert_eq!(booking.user_id, 42);
    assert_eq!(booking.ride_type, RideType::Airport);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.price, dec!(1210));
    assert!(booking.payment_id.is_some());
    assert!(matches!(details.ride_detail, Some(RideDetail::Airport(_))));

    assert_eq!(h.store.bookings.lock().len(), 1);
    assert_eq!(h.store.details.lock().len(), 1);
    let payments = h.store.payments.lock();
    let payment = payments.get(&booking.payment_id.unwrap()).unwrap();
    assert_eq!(payment.amount, dec!(1210));
    assert_eq!(payment.user_id, 42);
}

#[tokio::test]
async fn test_unknown_ride_type_writes_nothing() {
    let h = Harness::new();
    let mut ride = airport_ride("A", "B", "Sedan");
    ride.ride_type = "helicopter".to_string();

    let err = h
        .orchestrator
        .create_booking(draft(ride, 10, dec!(110)), 42)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidRideType(_)));
    assert!(h.store.bookings.lock().is_empty());
    assert!(h.store.payments.lock().is_empty());
}

#[tokio::test]
async fn test_outstation_without_drop_off_date_is_rejected() {
    let h = Harness::new();
    let mut ride = airport_ride("Pune", "Goa", "SUV");
    ride.ride_type = "outstation".to_string();

    let err = h
        .orchestrator
        .create_booking(draft(ride, 450, dec!(5415)), 42)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MissingField(ref f) if f == "dropOffDate"));
    assert!(h.store.bookings.lock().is_empty());
}

#[tokio::test]
async fn test_detail_failure_rolls_back_booking() {
    let h = Harness::new();
    Faults::arm(&h.store.faults.detail_insert);

    let err = h
        .orchestrator
        .create_booking(draft(rental_ride("4hr/40km"), 0, dec!(1800)), 42)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RideDetailCreationFailed(_)));
    assert!(h.store.bookings.lock().is_empty());
    assert!(h.store.details.lock().is_empty());
    assert!(h.store.payments.lock().is_empty());
}

#[tokio::test]
async fn test_failed_rollback_still_reports_detail_failure() {
    let h = Harness::new();
    Faults::arm(&h.store.faults.detail_insert);
    Faults::arm(&h.store.faults.booking_delete);

    let err = h
        .orchestrator
        .create_booking(draft(rental_ride("4hr/40km"), 0, dec!(1800)), 42)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RideDetailCreationFailed(_)));
    // The orphaned row stays behind; nothing else was written.
    assert_eq!(h.store.bookings.lock().len(), 1);
    assert!(h.store.details.lock().is_empty());
    assert!(h.store.payments.lock().is_empty());
}

#[tokio::test]
async fn test_payment_failure_still_creates_booking() {
    let h = Harness::new();
    Faults::arm(&h.store.faults.payment_insert);

    let details = h
        .orchestrator
        .create_booking(draft(airport_ride("A", "B", "Sedan"), 120, dec!(1210)), 42)
        .await
        .unwrap();

    assert!(details.booking.payment_id.is_none());
    assert!(details.ride_detail.is_some());
    assert_eq!(h.store.bookings.lock().len(), 1);
}

#[tokio::test]
async fn test_payment_link_failure_keeps_payment_row() {
    let h = Harness::new();
    Faults::arm(&h.store.faults.set_payment);

    let details = h
        .orchestrator
        .create_booking(draft(airport_ride("A", "B", "Sedan"), 120, dec!(1210)), 42)
        .await
        .unwrap();

    assert!(details.booking.payment_id.is_none());
    assert_eq!(h.store.payments.lock().len(), 1);
}

#[tokio::test]
async fn test_reread_failure_returns_written_rows() {
    let h = Harness::new();
    Faults::arm(&h.store.faults.booking_reads);

    let details = h
        .orchestrator
        .create_booking(draft(airport_ride("A", "B", "Sedan"), 120, dec!(1210)), 42)
        .await
        .unwrap();

    assert_eq!(details.booking.user_id, 42);
    assert!(details.booking.payment_id.is_some());
    assert!(matches!(details.ride_detail, Some(RideDetail::Airport(_))));
}

#[tokio::test]
async fn test_quote_and_create_prices_airport_ride() {
    let h = Harness::new();

    let details = h
        .orchestrator
        .quote_and_create(airport_ride("A", "B", "Sedan"), 42)
        .await
        .unwrap();

    assert_eq!(details.booking.distance, 120);
    assert_eq!(details.booking.price, dec!(1210));
}

#[tokio::test]
async fn test_quote_and_create_prices_rental_as_package() {
    let h = Harness::new();
    let mut ride = rental_ride("8hr/80km");
    ride.drop_location = Some("Airport".to_string());

    let details = h.orchestrator.quote_and_create(ride, 42).await.unwrap();

    assert_eq!(details.booking.distance, 0);
    assert_eq!(details.booking.price, dec!(1800));
}

#[tokio::test]
async fn test_quote_and_create_applies_coupon() {
    let h = Harness::new();
    let coupon = h.store.add_coupon(dec!(200), Duration::days(3));
    let mut ride = airport_ride("A", "B", "SUV");
    ride.coupon_id = Some(coupon);

    let details = h.orchestrator.quote_and_create(ride, 42).await.unwrap();

    // SUV: 15 + 120 * 12 = 1455
    assert_eq!(details.booking.price, dec!(1255));
    assert_eq!(details.booking.coupon_id, Some(coupon));
}

#[tokio::test]
async fn test_oversized_coupon_makes_ride_free() {
    let h = Harness::new();
    let coupon = h.store.add_coupon(dec!(5000), Duration::days(3));
    let mut ride = rental_ride("4hr/40km");
    ride.coupon_id = Some(coupon);

    let details = h.orchestrator.quote_and_create(ride, 42).await.unwrap();

    assert_eq!(details.booking.price, dec!(0));
}

#[tokio::test]
async fn test_expired_coupon_blocks_booking() {
    let h = Harness::new();
    let coupon = h.store.add_coupon(dec!(100), Duration::days(-1));
    let mut ride = airport_ride("A", "B", "Sedan");
    ride.coupon_id = Some(coupon);

    let err = h.orchestrator.quote_and_create(ride, 42).await.unwrap_err();

    assert!(matches!(err, AppError::CouponExpired(_)));
    assert!(h.store.bookings.lock().is_empty());
}

#[tokio::test]
async fn test_unknown_coupon_blocks_booking() {
    let h = Harness::new();
    let mut ride = airport_ride("A", "B", "Sedan");
    ride.coupon_id = Some(uuid::Uuid::new_v4());

    let err = h.orchestrator.quote_and_create(ride, 42).await.unwrap_err();

    assert!(matches!(err, AppError::CouponNotFound(_)));
}

#[tokio::test]
async fn test_get_booking_checks_owner() {
    let h = Harness::new();
    let created = h
        .orchestrator
        .quote_and_create(airport_ride("A", "B", "Sedan"), 42)
        .await
        .unwrap();
    let id = created.booking.id;

    let own = h.orchestrator.get_booking(id, 42).await.unwrap();
    assert_eq!(own.booking.id, id);

    let err = h.orchestrator.get_booking(id, 43).await.unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized(_)));

    let err = h
        .orchestrator
        .get_booking(uuid::Uuid::new_v4(), 42)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BookingNotFound(_)));
}

#[tokio::test]
async fn test_listings_join_details() {
    let h = Harness::new();
    h.store.add_driver(7, "8888888888");
    for _ in 0..3 {
        h.orchestrator
            .quote_and_create(airport_ride("A", "B", "Sedan"), 42)
            .await
            .unwrap();
    }
    let other = h
        .orchestrator
        .quote_and_create(rental_ride("4hr/40km"), 43)
        .await
        .unwrap();
    h.dispatch.assign_driver(other.booking.id, 7).await.unwrap();

    let mine = h.orchestrator.list_user_bookings(42).await.unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|d| d.ride_detail.is_some()));

    let page = h
        .orchestrator
        .list_all(None, Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.total_pages, 2);

    let assigned = h
        .orchestrator
        .list_all(Some(BookingStatus::DriverAssigned), Pagination::new(1, 50))
        .await
        .unwrap();
    assert_eq!(assigned.data.len(), 1);
    assert_eq!(assigned.data[0].assignment.as_ref().unwrap().driver_id, 7);
}
