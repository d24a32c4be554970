//! Driver handlers
//!
//! Sign-in and the ride actions. Each action goes through the status
//! synchronizer, which refuses drivers acting on rides they don't hold.

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use zingcab_auth::DriverUser;
use zingcab_core::models::DriverAction;
use zingcab_core::AppError;

use super::validated;
use crate::dto::{ApiResponse, DriverRidesQuery, RequestOtpRequest, VerifyOtpRequest};
use crate::state::AppState;

/// POST /api/drivers/request-otp
#[instrument(skip(state, req))]
pub async fn request_otp(
    state: web::Data<AppState>,
    req: web::Json<RequestOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Driver OTP")?;
    state.accounts.request_driver_otp(&req.phone_number).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("OTP sent successfully")))
}

/// POST /api/drivers/verify-otp
#[instrument(skip(state, req))]
pub async fn verify_otp(
    state: web::Data<AppState>,
    req: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Driver verify OTP")?;
    let session = state
        .accounts
        .verify_driver_otp(&req.phone_number, &req.otp)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(session, "Login successful")))
}

/// GET /api/drivers/bookings?status=
#[instrument(skip(state, driver), fields(driver_id = driver.id()))]
pub async fn bookings(
    state: web::Data<AppState>,
    driver: DriverUser,
    query: web::Query<DriverRidesQuery>,
) -> Result<HttpResponse, AppError> {
    let status = query.status_filter()?;
    let rides = state.dispatch.driver_rides(driver.id(), status).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        rides,
        "Driver bookings retrieved successfully",
    )))
}

async fn act(
    state: &AppState,
    driver: &DriverUser,
    assignment_id: Uuid,
    action: DriverAction,
    message: &str,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .sync
        .transition(assignment_id, driver.id(), action)
        .await?;

    if outcome.mirrored {
        info!(%assignment_id, %action, "Driver action applied");
    } else {
        warn!(%assignment_id, %action, "Driver action applied, booking status not updated");
    }

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(outcome.record, message)))
}

/// POST /api/drivers/bookings/{id}/start
#[instrument(skip(state, driver), fields(driver_id = driver.id()))]
pub async fn start_ride(
    state: web::Data<AppState>,
    driver: DriverUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    act(&state, &driver, path.into_inner(), DriverAction::Start, "Ride started successfully").await
}

/// POST /api/drivers/bookings/{id}/complete
#[instrument(skip(state, driver), fields(driver_id = driver.id()))]
pub async fn complete_ride(
    state: web::Data<AppState>,
    driver: DriverUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    act(
        &state,
        &driver,
        path.into_inner(),
        DriverAction::Complete,
        "Ride completed successfully",
    )
    .await
}

/// POST /api/drivers/bookings/{id}/no-show
#[instrument(skip(state, driver), fields(driver_id = driver.id()))]
pub async fn no_show(
    state: web::Data<AppState>,
    driver: DriverUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    act(&state, &driver, path.into_inner(), DriverAction::NoShow, "Ride marked as no-show").await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/drivers")
            .route("/request-otp", web::post().to(request_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/bookings", web::get().to(bookings))
            .route("/bookings/{id}/start", web::post().to(start_ride))
            .route("/bookings/{id}/complete", web::post().to(complete_ride))
            .route("/bookings/{id}/no-show", web::post().to(no_show)),
    );
}
