//! Rider booking handlers
//!
//! Every booking endpoint quotes the ride, applies the coupon and creates the
//! booking in one call. A bad coupon fails the request before anything is
//! written.

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;
use zingcab_auth::RiderUser;
use zingcab_core::models::RideRequest;
use zingcab_core::AppError;

use super::validated;
use crate::dto::{
    AirportBookingRequest, ApiResponse, ApplyCouponRequest, CalculatePriceRequest,
    OutstationBookingRequest, RentalBookingRequest,
};
use crate::state::AppState;

/// POST /api/bookings/calculate-price
#[instrument(skip(state, _rider, req))]
pub async fn calculate_price(
    state: web::Data<AppState>,
    _rider: RiderUser,
    req: web::Json<CalculatePriceRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Calculate price")?;

    let quote = state.orchestrator.pricing().quote(
        &req.pickup_location,
        req.drop_location.as_deref(),
        &req.cab_type,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(quote, "Ride details calculated")))
}

/// POST /api/bookings/apply-coupon
#[instrument(skip(state, _rider, req))]
pub async fn apply_coupon(
    state: web::Data<AppState>,
    _rider: RiderUser,
    req: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse, AppError> {
    if req.price < Decimal::ZERO {
        return Err(AppError::InvalidInput("Price cannot be negative".to_string()));
    }

    let applied = state
        .orchestrator
        .pricing()
        .apply_coupon(Some(req.coupon_id), req.price)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(applied, "Coupon applied successfully")))
}

async fn book(
    state: &AppState,
    rider: &RiderUser,
    ride: RideRequest,
    message: &str,
) -> Result<HttpResponse, AppError> {
    let details = state.orchestrator.quote_and_create(ride, rider.id()).await?;
    info!(
        booking_id = %details.booking.id,
        user_id = rider.id(),
        "Booking created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(details, message)))
}

/// POST /api/bookings/rental
#[instrument(skip(state, rider, req), fields(user_id = rider.id()))]
pub async fn create_rental(
    state: web::Data<AppState>,
    rider: RiderUser,
    req: web::Json<RentalBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Rental booking")?;
    book(&state, &rider, req.into(), "Rental ride booking created successfully").await
}

/// POST /api/bookings/airport
#[instrument(skip(state, rider, req), fields(user_id = rider.id()))]
pub async fn create_airport(
    state: web::Data<AppState>,
    rider: RiderUser,
    req: web::Json<AirportBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Airport booking")?;
    book(&state, &rider, req.into(), "Airport ride booking created successfully").await
}

/// POST /api/bookings/outstation
#[instrument(skip(state, rider, req), fields(user_id = rider.id()))]
pub async fn create_outstation(
    state: web::Data<AppState>,
    rider: RiderUser,
    req: web::Json<OutstationBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Outstation booking")?;
    book(&state, &rider, req.into(), "Outstation ride booking created successfully").await
}

/// GET /api/bookings/{id}
#[instrument(skip(state, rider), fields(user_id = rider.id()))]
pub async fn get_booking(
    state: web::Data<AppState>,
    rider: RiderUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let details = state
        .orchestrator
        .get_booking(path.into_inner(), rider.id())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        details,
        "Booking retrieved successfully",
    )))
}

/// POST /api/bookings/{id}/cancel
#[instrument(skip(state, rider), fields(user_id = rider.id()))]
pub async fn cancel_booking(
    state: web::Data<AppState>,
    rider: RiderUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let outcome = state.sync.cancel(path.into_inner(), rider.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        outcome.record,
        "Booking cancelled successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("/calculate-price", web::post().to(calculate_price))
            .route("/apply-coupon", web::post().to(apply_coupon))
            .route("/rental", web::post().to(create_rental))
            .route("/airport", web::post().to(create_airport))
            .route("/outstation", web::post().to(create_outstation))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/cancel", web::post().to(cancel_booking)),
    );
}
