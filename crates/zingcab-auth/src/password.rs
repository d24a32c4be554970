//! Administrator password hashing (Argon2id, PHC string format)

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use tracing::{debug, error};
use zingcab_core::error::AppError;

/// Argon2id hasher for back-office accounts
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// # Examples
    ///
    /// ```
    /// use zingcab_auth::PasswordService;
    ///
    /// let passwords = PasswordService::new();
    /// let hash = passwords.hash_password("admin-secret")?;
    /// assert!(passwords.verify_password("admin-secret", &hash)?);
    /// # Ok::<(), zingcab_core::error::AppError>(())
    /// ```
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::PasswordHash(format!("Password hashing failed: {}", e))
            })?;

        Ok(hash.to_string())
    }

    /// `Ok(false)` on a wrong password, `Err` only when the stored hash is unusable
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "Stored password hash is malformed");
            AppError::PasswordHash(format!("Invalid password hash format: {}", e))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password mismatch");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Password verification error");
                Err(AppError::PasswordHash(format!(
                    "Password verification failed: {}",
                    e
                )))
            }
        }
    }

    /// Login check: a mismatch becomes `InvalidCredentials`
    pub fn check(&self, password: &str, hash: &str) -> Result<(), AppError> {
        if self.verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2_phc() {
        let hash = PasswordService::new().hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify() {
        let service = PasswordService::new();
        let hash = service.hash_password("admin123").unwrap();

        assert!(service.verify_password("admin123", &hash).unwrap());
        assert!(!service.verify_password("admin124", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let service = PasswordService::new();
        let a = service.hash_password("same").unwrap();
        let b = service.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_check_maps_mismatch_to_invalid_credentials() {
        let service = PasswordService::new();
        let hash = service.hash_password("right").unwrap();

        assert!(service.check("right", &hash).is_ok());
        assert!(matches!(
            service.check("wrong", &hash),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_malformed_hash() {
        let result = PasswordService::new().verify_password("x", "plaintext-password");
        assert!(matches!(result, Err(AppError::PasswordHash(_))));
    }
}
