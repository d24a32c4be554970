//! JWT Claims structure
//!
//! Riders, drivers and admins all carry the same claim shape; `role` tells
//! which table `sub` refers to.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use zingcab_core::{models::Role, AppError};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (account id within the role's table)
    pub sub: String,

    /// Account role
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for an account, valid for `expires_in_secs`
    ///
    /// # Examples
    ///
    /// ```
    /// use zingcab_auth::Claims;
    /// use zingcab_core::models::Role;
    ///
    /// let claims = Claims::for_account(42, Role::User, 3600);
    /// assert_eq!(claims.sub, "42");
    /// assert!(!claims.is_expired());
    /// ```
    pub fn for_account(account_id: i32, role: Role, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: account_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Numeric account id carried in `sub`
    pub fn account_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::InvalidToken("Malformed subject".to_string()))
    }
}
