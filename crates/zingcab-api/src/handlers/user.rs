//! Rider profile handlers
//!
//! Every route here requires a rider token.

use actix_web::{web, HttpResponse};
use tracing::instrument;
use zingcab_auth::RiderUser;
use zingcab_core::AppError;

use super::validated;
use crate::dto::{ApiResponse, UpdateProfileRequest};
use crate::state::AppState;

/// GET /api/users/profile
#[instrument(skip(state, rider), fields(user_id = rider.id()))]
pub async fn profile(state: web::Data<AppState>, rider: RiderUser) -> Result<HttpResponse, AppError> {
    let user = state.accounts.rider_profile(rider.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        user,
        "User profile retrieved successfully",
    )))
}

/// PUT /api/users/profile
#[instrument(skip(state, rider, req), fields(user_id = rider.id()))]
pub async fn update_profile(
    state: web::Data<AppState>,
    rider: RiderUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Update profile")?;
    let user = state
        .accounts
        .update_rider_profile(rider.id(), req.into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        user,
        "User profile updated successfully",
    )))
}

/// DELETE /api/users/account
#[instrument(skip(state, rider), fields(user_id = rider.id()))]
pub async fn delete_account(state: web::Data<AppState>, rider: RiderUser) -> Result<HttpResponse, AppError> {
    state.accounts.delete_rider(rider.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("User account deleted successfully")))
}

/// GET /api/users/bookings
#[instrument(skip(state, rider), fields(user_id = rider.id()))]
pub async fn bookings(state: web::Data<AppState>, rider: RiderUser) -> Result<HttpResponse, AppError> {
    let bookings = state.orchestrator.list_user_bookings(rider.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        bookings,
        "User bookings retrieved successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/profile", web::get().to(profile))
            .route("/profile", web::put().to(update_profile))
            .route("/account", web::delete().to(delete_account))
            .route("/bookings", web::get().to(bookings)),
    );
}
