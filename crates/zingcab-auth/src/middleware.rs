//! Actix-web request extractors for authenticated riders, drivers and admins
//!
//! Tokens are read from the `Authorization: Bearer` header first and the
//! `token` cookie second. Failures render through `AppError`, so a missing
//! or bad token is a 401 and a token of the wrong role is a 403.

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::sync::Arc;
use tracing::{debug, warn};
use zingcab_core::error::AppError;
use zingcab_core::models::Role;

fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie("token").map(|c| c.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .ok_or_else(|| {
            warn!("JwtService not found in app data");
            AppError::Internal("Authentication service not configured".to_string())
        })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token)?;
    let account_id = claims.account_id()?;

    debug!(account_id, role = %claims.role, "Request authenticated");

    Ok(AuthenticatedUser {
        account_id,
        role: claims.role,
        claims,
    })
}

fn require_role(req: &HttpRequest, role: Role) -> Result<AuthenticatedUser, AppError> {
    let user = authenticate(req)?;
    if user.role != role {
        warn!(
            account_id = user.account_id,
            role = %user.role,
            required = %role,
            "Token role does not grant access"
        );
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

/// Any authenticated account
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use zingcab_auth::middleware::AuthenticatedUser;
///
/// async fn whoami(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().json(serde_json::json!({
///         "id": user.account_id,
///         "role": user.role
///     }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Id within the role's account table
    pub account_id: i32,

    pub role: Role,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthenticatedUser);

        impl $name {
            pub fn id(&self) -> i32 {
                self.0.account_id
            }
        }

        impl std::ops::Deref for $name {
            type Target = AuthenticatedUser;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                ready(
                    require_role(req, $role)
                        .map($name)
                        .map_err(actix_web::Error::from),
                )
            }
        }
    };
}

role_extractor!(
    /// Rider token required
    RiderUser,
    Role::User
);
role_extractor!(
    /// Driver token required
    DriverUser,
    Role::Driver
);
role_extractor!(
    /// Admin token required
    AdminUser,
    Role::Admin
);
