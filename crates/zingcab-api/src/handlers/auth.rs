//! Rider authentication handlers
//!
//! Riders sign in with a one-time code sent to their phone. A code for an
//! unregistered phone is still issued so the same code can complete sign-up.

use actix_web::{web, HttpResponse};
use tracing::{debug, instrument};
use zingcab_core::AppError;

use super::validated;
use crate::dto::{ApiResponse, RegisterRequest, RequestOtpRequest, RequestOtpResponse, VerifyOtpRequest};
use crate::state::AppState;

/// POST /api/auth/request-otp
#[instrument(skip(state, req))]
pub async fn request_otp(
    state: web::Data<AppState>,
    req: web::Json<RequestOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Request OTP")?;

    let is_new_user = state.accounts.request_rider_otp(&req.phone_number).await?;
    debug!(is_new_user, "Rider OTP issued");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        RequestOtpResponse { is_new_user },
        "OTP sent successfully",
    )))
}

/// POST /api/auth/verify-otp
#[instrument(skip(state, req))]
pub async fn verify_otp(
    state: web::Data<AppState>,
    req: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Verify OTP")?;

    let verification = state
        .accounts
        .verify_rider_otp(&req.phone_number, &req.otp)
        .await?;

    let message = if verification.is_new_user {
        "OTP verified successfully"
    } else {
        "Login successful"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(verification, message)))
}

/// POST /api/auth/register
#[instrument(skip(state, req))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let (new_user, otp) = validated(req, "Register")?.into_parts();

    let session = state.accounts.register_rider(new_user, &otp).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        session,
        "User registered successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/request-otp", web::post().to(request_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/register", web::post().to(register)),
    );
}
