//! One-time code issuance and verification

use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use zingcab_core::{
    config::{OtpConfig, SmsConfig},
    models::{Credential, VerifyOutcome},
    traits::{CredentialStore, SmsGateway},
    AppError, AppResult,
};

use crate::constants::{OTP_LENGTH, OTP_MESSAGE_PREFIX};

/// Random six-digit numeric code, never starting with 0
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    debug_assert_eq!(n.to_string().len(), OTP_LENGTH);
    n.to_string()
}

/// Issues codes into a `CredentialStore` and sends them through an `SmsGateway`
pub struct OtpService {
    store: Arc<dyn CredentialStore>,
    sms: Arc<dyn SmsGateway>,
    ttl: Duration,
    country_code: String,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sms: Arc<dyn SmsGateway>,
        ttl: Duration,
        country_code: &str,
    ) -> Self {
        Self {
            store,
            sms,
            ttl,
            country_code: country_code.to_string(),
        }
    }

    pub fn from_config(
        store: Arc<dyn CredentialStore>,
        sms: Arc<dyn SmsGateway>,
        otp: &OtpConfig,
        sms_config: &SmsConfig,
    ) -> Self {
        Self::new(
            store,
            sms,
            Duration::seconds(otp.ttl_secs),
            &sms_config.country_code,
        )
    }

    /// Generate a code, overwrite any previous one and send it
    ///
    /// The code stays stored even if delivery fails; the caller may ask again.
    #[instrument(skip(self))]
    pub async fn issue(&self, phone_number: &str) -> AppResult<()> {
        let credential = Credential::new(phone_number, generate_code(), self.ttl);
        let message = format!("{}{}", OTP_MESSAGE_PREFIX, credential.code);

        self.store.put(credential).await?;

        let to = format!("{}{}", self.country_code, phone_number);
        self.sms.send(&to, &message).await.map_err(|e| {
            error!("SMS delivery failed for {}: {}", phone_number, e);
            e
        })?;

        info!("OTP issued for {}", phone_number);
        Ok(())
    }

    /// Raw verification outcome
    #[instrument(skip(self, code))]
    pub async fn check(&self, phone_number: &str, code: &str) -> AppResult<VerifyOutcome> {
        let outcome = self.store.verify(phone_number, code, Utc::now()).await?;
        debug!("OTP check for {}: {:?}", phone_number, outcome);
        Ok(outcome)
    }

    /// Verification as a result: anything but a match is an error
    pub async fn verify(&self, phone_number: &str, code: &str) -> AppResult<()> {
        match self.check(phone_number, code).await? {
            VerifyOutcome::Verified => Ok(()),
            VerifyOutcome::NotFound => Err(AppError::CredentialNotFound),
            VerifyOutcome::Expired => Err(AppError::CredentialExpired),
            VerifyOutcome::Mismatch => Err(AppError::CredentialMismatch),
        }
    }
}

/// Periodically drop expired codes until the returned handle is aborted
pub fn spawn_sweeper(
    store: Arc<dyn CredentialStore>,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.sweep_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => debug!("Swept {} expired OTPs", n),
                Err(e) => warn!("OTP sweep failed: {}", e),
            }
        }
    })
}
