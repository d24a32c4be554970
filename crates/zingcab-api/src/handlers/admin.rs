//! Admin handlers
//!
//! Everything here except login requires an admin token.

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};
use zingcab_auth::AdminUser;
use zingcab_core::AppError;

use super::validated;
use crate::dto::{
    AdminLoginRequest, ApiResponse, AssignCarRequest, AssignDriverRequest, BookingListQuery,
    CreateCarRequest, CreateDriverRequest,
};
use crate::state::AppState;

/// POST /api/admin/login
#[instrument(skip(state, req))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Admin login")?;
    let session = state
        .accounts
        .admin_login(req.email.trim(), &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(session, "Admin login successful")))
}

/// GET /api/admin/bookings?status=&page=&limit=
#[instrument(skip(state, _admin))]
pub async fn list_bookings(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<BookingListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    validator::Validate::validate(&query)?;

    let page = state
        .orchestrator
        .list_all(query.status_filter()?, query.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(page, "Bookings retrieved successfully")))
}

/// POST /api/admin/bookings/assign-driver
#[instrument(skip(state, admin, req), fields(admin_id = admin.id()))]
pub async fn assign_driver(
    state: web::Data<AppState>,
    admin: AdminUser,
    req: web::Json<AssignDriverRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Assign driver")?;
    let outcome = state
        .dispatch
        .assign_driver(req.booking_id, req.driver_id)
        .await?;

    info!(
        booking_id = %req.booking_id,
        driver_id = req.driver_id,
        booking_status = %outcome.booking_status,
        booking_updated = outcome.mirrored,
        "Driver assigned by admin"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(outcome, "Driver assigned successfully")))
}

/// POST /api/admin/drivers
#[instrument(skip(state, _admin, req))]
pub async fn create_driver(
    state: web::Data<AppState>,
    _admin: AdminUser,
    req: web::Json<CreateDriverRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Create driver")?;
    let driver = state.accounts.register_driver(req.into()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(driver, "Driver registered successfully")))
}

/// GET /api/admin/drivers
#[instrument(skip(state, _admin))]
pub async fn list_drivers(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
    let drivers = state.accounts.list_drivers().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(drivers, "Drivers retrieved successfully")))
}

/// POST /api/admin/cars
#[instrument(skip(state, _admin, req))]
pub async fn create_car(
    state: web::Data<AppState>,
    _admin: AdminUser,
    req: web::Json<CreateCarRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Register car")?;
    let car = state.backoffice.register_car(req.into()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(car, "Car registered successfully")))
}

/// GET /api/admin/cars
#[instrument(skip(state, _admin))]
pub async fn list_cars(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
    let cars = state.backoffice.list_cars().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(cars, "Cars retrieved successfully")))
}

/// POST /api/admin/cars/assign-driver
#[instrument(skip(state, admin, req), fields(admin_id = admin.id()))]
pub async fn assign_car(
    state: web::Data<AppState>,
    admin: AdminUser,
    req: web::Json<AssignCarRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Assign car")?;
    let car = state.backoffice.assign_car(req.car_id, req.driver_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        car,
        "Car assigned to driver successfully",
    )))
}

/// GET /api/admin/contact-queries
#[instrument(skip(state, _admin))]
pub async fn list_contact_queries(
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let queries = state.backoffice.list_contact_queries().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        queries,
        "Contact queries retrieved successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(login))
            .route("/bookings", web::get().to(list_bookings))
            .route("/bookings/assign-driver", web::post().to(assign_driver))
            .route("/drivers", web::post().to(create_driver))
            .route("/drivers", web::get().to(list_drivers))
            .route("/cars", web::post().to(create_car))
            .route("/cars", web::get().to(list_cars))
            .route("/cars/assign-driver", web::post().to(assign_car))
            .route("/contact-queries", web::get().to(list_contact_queries)),
    );
}
