//! Rider, driver and admin sign-in flows
//!
//! Riders and drivers prove their phone with a one-time code; admins use an
//! email and an Argon2 password hash. Every successful sign-in returns a JWT
//! scoped to the account's role. Each sign-in step counts against the
//! `AuthThrottle` budget of its phone number or email before any work is done.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use zingcab_auth::{JwtService, PasswordService};
use zingcab_core::{
    models::{Admin, Driver, NewDriver, NewUser, Role, User, UserUpdate},
    traits::{AdminRepository, BookingRepository, DriverRepository, UserRepository},
    AppError, AppResult,
};

use crate::otp::OtpService;
use crate::rate_limit::{AuthScope, AuthThrottle};

/// Result of a rider code check
///
/// Known riders get a token; unknown ones are told to register.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderVerification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiderSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverSession {
    pub driver: Driver,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub admin: Admin,
    pub token: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    drivers: Arc<dyn DriverRepository>,
    admins: Arc<dyn AdminRepository>,
    bookings: Arc<dyn BookingRepository>,
    otp: Arc<OtpService>,
    jwt: Arc<JwtService>,
    throttle: AuthThrottle,
    passwords: PasswordService,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        drivers: Arc<dyn DriverRepository>,
        admins: Arc<dyn AdminRepository>,
        bookings: Arc<dyn BookingRepository>,
        otp: Arc<OtpService>,
        jwt: Arc<JwtService>,
        throttle: AuthThrottle,
    ) -> Self {
        Self {
            users,
            drivers,
            admins,
            bookings,
            otp,
            jwt,
            throttle,
            passwords: PasswordService::new(),
        }
    }

    /// Send a code to a rider's phone; returns whether the phone is unregistered
    #[instrument(skip(self))]
    pub async fn request_rider_otp(&self, phone_number: &str) -> AppResult<bool> {
        self.throttle.attempt(AuthScope::Rider, phone_number).await?;
        self.otp.issue(phone_number).await?;
        let is_new_user = self.users.find_by_phone(phone_number).await?.is_none();
        Ok(is_new_user)
    }

    /// Check a rider's code
    ///
    /// The code is consumed either way; an unknown phone has to request a
    /// fresh one to register.
    #[instrument(skip(self, code))]
    pub async fn verify_rider_otp(&self, phone_number: &str, code: &str) -> AppResult<RiderVerification> {
        self.throttle.attempt(AuthScope::Rider, phone_number).await?;
        self.otp.verify(phone_number, code).await?;

        match self.users.find_by_phone(phone_number).await? {
            Some(user) => {
                let token = self.jwt.issue(user.id, Role::User)?;
                info!("Rider {} signed in", user.id);
                Ok(RiderVerification {
                    user: Some(user),
                    token: Some(token),
                    is_new_user: false,
                })
            }
            None => Ok(RiderVerification {
                user: None,
                token: None,
                is_new_user: true,
            }),
        }
    }

    /// Verify the code and create the rider account
    #[instrument(skip(self, new_user, code), fields(phone = %new_user.phone_number))]
    pub async fn register_rider(&self, new_user: NewUser, code: &str) -> AppResult<RiderSession> {
        self.throttle
            .attempt(AuthScope::Rider, &new_user.phone_number)
            .await?;
        self.otp.verify(&new_user.phone_number, code).await?;

        if self.users.find_by_phone(&new_user.phone_number).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = self.users.create(&new_user).await?;
        let token = self.jwt.issue(user.id, Role::User)?;
        info!("Rider {} registered", user.id);

        Ok(RiderSession { user, token })
    }

    pub async fn rider_profile(&self, user_id: i32) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    /// Change profile fields; the phone number stays as registered
    #[instrument(skip(self, update))]
    pub async fn update_rider_profile(&self, user_id: i32, update: UserUpdate) -> AppResult<User> {
        if update.is_empty() {
            return self.rider_profile(user_id).await;
        }

        let user = self
            .users
            .update(user_id, &update)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        info!("Rider {} updated their profile", user_id);
        Ok(user)
    }

    /// Delete a rider with their booking history
    ///
    /// Refused while any of their bookings is still pending, assigned or
    /// in progress.
    #[instrument(skip(self))]
    pub async fn delete_rider(&self, user_id: i32) -> AppResult<()> {
        let active = self
            .bookings
            .list_by_user(user_id)
            .await?
            .iter()
            .filter(|b| !b.status.is_terminal())
            .count();
        if active > 0 {
            warn!("Rider {} tried to delete account with {} active bookings", user_id, active);
            return Err(AppError::Conflict(
                "Cannot delete account with active bookings".to_string(),
            ));
        }

        if !self.users.delete(user_id).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        info!("Rider {} deleted their account", user_id);
        Ok(())
    }

    /// Send a code to a registered driver
    #[instrument(skip(self))]
    pub async fn request_driver_otp(&self, phone_number: &str) -> AppResult<()> {
        self.throttle.attempt(AuthScope::Driver, phone_number).await?;
        if self.drivers.find_by_phone(phone_number).await?.is_none() {
            return Err(AppError::DriverNotFound(phone_number.to_string()));
        }
        self.otp.issue(phone_number).await
    }

    #[instrument(skip(self, code))]
    pub async fn verify_driver_otp(&self, phone_number: &str, code: &str) -> AppResult<DriverSession> {
        self.throttle.attempt(AuthScope::Driver, phone_number).await?;
        self.otp.verify(phone_number, code).await?;

        let driver = self
            .drivers
            .find_by_phone(phone_number)
            .await?
            .ok_or_else(|| AppError::DriverNotFound(phone_number.to_string()))?;

        let token = self.jwt.issue(driver.id, Role::Driver)?;
        info!("Driver {} signed in", driver.id);
        Ok(DriverSession { driver, token })
    }

    pub async fn register_driver(&self, new_driver: NewDriver) -> AppResult<Driver> {
        let driver = self.drivers.create(&new_driver).await?;
        info!("Driver {} registered", driver.id);
        Ok(driver)
    }

    pub async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        self.drivers.list_all().await
    }

    /// Email and password sign-in; unknown email and wrong password look the same
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, email: &str, password: &str) -> AppResult<AdminSession> {
        self.throttle.attempt(AuthScope::Admin, email).await?;
        let admin = self.admins.find_by_email(email).await?.ok_or_else(|| {
            warn!("Admin login for unknown email");
            AppError::InvalidCredentials
        })?;

        self.passwords.check(password, &admin.password_hash)?;

        let token = self.jwt.issue(admin.id, Role::Admin)?;
        info!("Admin {} signed in", admin.id);
        Ok(AdminSession { admin, token })
    }
}
