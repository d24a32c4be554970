//! JWT token creation and validation service

use crate::claims::Claims;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error, warn};
use zingcab_core::config::AuthConfig;
use zingcab_core::error::AppError;
use zingcab_core::models::Role;

/// Token lifetime per role, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub rider_secs: i64,
    pub driver_secs: i64,
    pub admin_secs: i64,
}

impl TokenLifetimes {
    pub fn for_role(&self, role: Role) -> i64 {
        match role {
            Role::User => self.rider_secs,
            Role::Driver => self.driver_secs,
            Role::Admin => self.admin_secs,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            rider_secs: 7 * 24 * 3600,
            driver_secs: 7 * 24 * 3600,
            admin_secs: 24 * 3600,
        }
    }
}

/// JWT Service for token creation and validation
#[derive(Clone)]
pub struct JwtService {
    lifetimes: TokenLifetimes,

    /// Encoding key (cached)
    encoding_key: EncodingKey,

    /// Decoding key (cached)
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    ///
    /// # Examples
    ///
    /// ```
    /// use zingcab_auth::{JwtService, TokenLifetimes};
    ///
    /// let jwt_service = JwtService::new("my-secret-key", TokenLifetimes::default());
    /// ```
    pub fn new(secret: &str, lifetimes: TokenLifetimes) -> Self {
        Self {
            lifetimes,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Build from the `auth` configuration section
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            TokenLifetimes {
                rider_secs: config.rider_token_ttl_secs,
                driver_secs: config.driver_token_ttl_secs,
                admin_secs: config.admin_token_ttl_secs,
            },
        )
    }

    /// Create a JWT token from claims
    pub fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        debug!(
            sub = %claims.sub,
            role = %claims.role,
            exp = %claims.exp,
            "Creating JWT token"
        );

        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to create JWT token");
            AppError::Internal(format!("Token creation failed: {}", e))
        })
    }

    /// Issue a token for an account with its role's lifetime
    ///
    /// # Examples
    ///
    /// ```
    /// use zingcab_auth::{JwtService, TokenLifetimes};
    /// use zingcab_core::models::Role;
    ///
    /// let jwt_service = JwtService::new("secret", TokenLifetimes::default());
    /// let token = jwt_service.issue(42, Role::User)?;
    /// let claims = jwt_service.validate_token(&token)?;
    /// assert_eq!(claims.sub, "42");
    /// # Ok::<(), zingcab_core::error::AppError>(())
    /// ```
    pub fn issue(&self, account_id: i32, role: Role) -> Result<String, AppError> {
        let claims = Claims::for_account(account_id, role, self.lifetimes.for_role(role));
        self.create_token(&claims)
    }

    /// Validate a JWT token and extract claims
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `AppError::TokenExpired` if the token has expired
    /// - `AppError::InvalidToken` if the token is invalid
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                warn!("Token expired");
                return AppError::TokenExpired;
            }

            warn!(error = %e, "Invalid token");
            AppError::InvalidToken(format!("Token validation failed: {}", e))
        })?;

        let claims = token_data.claims;

        // Validation allows a leeway; tokens are dead at `exp` here
        if claims.is_expired() {
            warn!(sub = %claims.sub, "Token expired (manual check)");
            return Err(AppError::TokenExpired);
        }

        debug!(sub = %claims.sub, role = %claims.role, "Token validated successfully");

        Ok(claims)
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("lifetimes", &self.lifetimes)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-12345";

    fn service() -> JwtService {
        JwtService::new(TEST_SECRET, TokenLifetimes::default())
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt_service = service();

        let token = jwt_service.issue(42, Role::User).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.account_id().unwrap(), 42);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_role_lifetimes() {
        let jwt_service = service();
        let now = Utc::now().timestamp();

        let admin = jwt_service
            .validate_token(&jwt_service.issue(1, Role::Admin).unwrap())
            .unwrap();
        assert!(admin.exp <= now + 24 * 3600 + 1);

        let driver = jwt_service
            .validate_token(&jwt_service.issue(7, Role::Driver).unwrap())
            .unwrap();
        assert!(driver.exp > now + 6 * 24 * 3600);
    }

    #[test]
    fn test_expired_token() {
        let jwt_service = service();

        let claims = Claims::for_account(42, Role::User, -120);
        let token = jwt_service.create_token(&claims).unwrap();

        let result = jwt_service.validate_token(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let result = service().validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let issuer = JwtService::new("secret1", TokenLifetimes::default());
        let verifier = JwtService::new("secret2", TokenLifetimes::default());

        let token = issuer.issue(42, Role::User).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_debug_impl_hides_secret() {
        let debug_str = format!("{:?}", service());

        assert!(debug_str.contains("JwtService"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(TEST_SECRET));
    }
}
