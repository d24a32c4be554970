//! Full ride from sign-in to completion, plus account flows

mod common;

use common::*;
use zingcab_core::models::{AssignmentStatus, BookingStatus, DriverAction, NewDriver, NewUser, Role};
use zingcab_core::traits::UserRepository;
use zingcab_core::AppError;

fn new_rider(phone: &str) -> NewUser {
    NewUser {
        name: "Asha".to_string(),
        phone_number: phone.to_string(),
        gender: None,
        email: Some("asha@example.com".to_string()),
        dob: None,
        display_name: None,
    }
}

#[tokio::test]
async fn test_airport_ride_end_to_end() {
    let h = Harness::new();
    h.store.add_user(42, "9999999999");
    h.store.add_driver(7, "8888888888");

    // rider signs in
    let is_new = h.accounts.request_rider_otp("9999999999").await.unwrap();
    assert!(!is_new);
    let code = h.code_for("9999999999");
    let session = h.accounts.verify_rider_otp("9999999999", &code).await.unwrap();
    let token = session.token.unwrap();
    let claims = h.jwt.validate_token(&token).unwrap();
    assert_eq!(claims.account_id().unwrap(), 42);
    assert_eq!(claims.role, Role::User);

    // the code is single-use
    let err = h.accounts.verify_rider_otp("9999999999", &code).await.unwrap_err();
    assert!(matches!(err, AppError::CredentialNotFound));

    // book, assign, drive
    let booking = h
        .orchestrator
        .quote_and_create(airport_ride("A", "B", "Sedan"), 42)
        .await
        .unwrap()
        .booking;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(booking.payment_id.is_some());

    let assignment = h.dispatch.assign_driver(booking.id, 7).await.unwrap().assignment;
    assert_eq!(h.store.booking(booking.id).unwrap().status, BookingStatus::DriverAssigned);

    h.sync.transition(assignment.id, 7, DriverAction::Start).await.unwrap();
    assert_eq!(h.store.booking(booking.id).unwrap().status, BookingStatus::InProgress);

    let done = h.sync.transition(assignment.id, 7, DriverAction::Complete).await.unwrap();
    assert_eq!(done.record.status, AssignmentStatus::Completed);

    let view = h.orchestrator.get_booking(booking.id, 42).await.unwrap();
    assert_eq!(view.booking.status, BookingStatus::Completed);
    assert_eq!(view.assignment.unwrap().status, AssignmentStatus::Completed);

    // too late to cancel
    let err = h.sync.cancel(booking.id, 42).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_new_rider_registers_with_fresh_code() {
    let h = Harness::new();

    assert!(h.accounts.request_rider_otp("9000000001").await.unwrap());
    let code = h.code_for("9000000001");
    let verification = h.accounts.verify_rider_otp("9000000001", &code).await.unwrap();
    assert!(verification.is_new_user);
    assert!(verification.token.is_none());

    // the first code was consumed by the check
    h.accounts.request_rider_otp("9000000001").await.unwrap();
    let code = h.code_for("9000000001");
    let session = h
        .accounts
        .register_rider(new_rider("9000000001"), &code)
        .await
        .unwrap();

    assert_eq!(session.user.phone_number, "9000000001");
    let stored = UserRepository::find_by_phone(h.store.as_ref(), "9000000001")
        .await
        .unwrap();
    assert_eq!(stored.unwrap().id, session.user.id);
    assert_eq!(h.accounts.rider_profile(session.user.id).await.unwrap().name, "Asha");
}

#[tokio::test]
async fn test_register_existing_rider_conflicts() {
    let h = Harness::new();
    h.store.add_user(42, "9999999999");

    h.accounts.request_rider_otp("9999999999").await.unwrap();
    let code = h.code_for("9999999999");
    let err = h
        .accounts
        .register_rider(new_rider("9999999999"), &code)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_wrong_code_keeps_credential() {
    let h = Harness::new();
    h.store.add_user(42, "9999999999");
    h.accounts.request_rider_otp("9999999999").await.unwrap();
    let code = h.code_for("9999999999");
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let err = h.accounts.verify_rider_otp("9999999999", wrong).await.unwrap_err();
    assert!(matches!(err, AppError::CredentialMismatch));

    assert!(h.accounts.verify_rider_otp("9999999999", &code).await.is_ok());
}

#[tokio::test]
async fn test_driver_sign_in() {
    let h = Harness::new();

    let err = h.accounts.request_driver_otp("8888888888").await.unwrap_err();
    assert!(matches!(err, AppError::DriverNotFound(_)));

    let driver = h
        .accounts
        .register_driver(NewDriver {
            name: "Ravi".to_string(),
            phone_number: "8888888888".to_string(),
            driving_license: "KA-01-2020".to_string(),
        })
        .await
        .unwrap();

    h.accounts.request_driver_otp("8888888888").await.unwrap();
    let code = h.code_for("8888888888");
    let session = h.accounts.verify_driver_otp("8888888888", &code).await.unwrap();

    assert_eq!(session.driver.id, driver.id);
    let claims = h.jwt.validate_token(&session.token).unwrap();
    assert_eq!(claims.role, Role::Driver);
    assert_eq!(h.accounts.list_drivers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_login() {
    let h = Harness::new();
    h.store.add_admin("ops@zingcab.in", "s3cret-pass");

    let session = h.accounts.admin_login("ops@zingcab.in", "s3cret-pass").await.unwrap();
    let claims = h.jwt.validate_token(&session.token).unwrap();
    assert_eq!(claims.role, Role::Admin);

    let err = h.accounts.admin_login("ops@zingcab.in", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    let err = h.accounts.admin_login("nobody@zingcab.in", "s3cret-pass").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_rider_sign_in_attempts_are_limited_per_phone() {
    let h = Harness::new();
    h.store.add_user(42, "9999999999");

    for _ in 0..10 {
        h.accounts.request_rider_otp("9999999999").await.unwrap();
    }
    let code = h.code_for("9999999999");

    let err = h.accounts.request_rider_otp("9999999999").await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));
    assert_eq!(err.to_string(), "Too many login attempts, please try again later.");

    // a rejected attempt neither issues nor checks a code
    let err = h.accounts.verify_rider_otp("9999999999", &code).await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));
    assert_eq!(h.code_for("9999999999"), code);

    // other phones and the driver flow keep their own budget
    assert!(h.accounts.request_rider_otp("9000000001").await.unwrap());
    h.store.add_driver(7, "9999999999");
    h.accounts.request_driver_otp("9999999999").await.unwrap();
}

#[tokio::test]
async fn test_admin_login_attempts_are_limited_per_email() {
    let h = Harness::new();
    h.store.add_admin("ops@zingcab.in", "s3cret-pass");

    for _ in 0..10 {
        let err = h.accounts.admin_login("ops@zingcab.in", "guess").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    let err = h
        .accounts
        .admin_login("OPS@zingcab.in", "s3cret-pass")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));
}
