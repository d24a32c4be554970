//! Public contact form

use actix_web::{web, HttpResponse};
use tracing::instrument;
use zingcab_core::AppError;

use super::validated;
use crate::dto::{ApiResponse, ContactRequest};
use crate::state::AppState;

/// POST /api/contact
#[instrument(skip(state, req))]
pub async fn submit(
    state: web::Data<AppState>,
    req: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    let req = validated(req, "Contact form")?;
    let saved = state.backoffice.submit_contact(req.into()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        saved,
        "Contact form submitted successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::post().to(submit));
}
