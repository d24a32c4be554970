//! SMS gateways
//!
//! `TwilioSmsGateway` posts to the Twilio Messages API. `LogSmsGateway` is
//! the non-production stand-in: it writes the message to the log so codes
//! can be read without sending anything.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use zingcab_core::{config::SmsConfig, traits::SmsGateway, AppError, AppResult};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio REST client
pub struct TwilioSmsGateway {
    http_client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsGateway {
    pub fn new(
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
        timeout_ms: u64,
    ) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AppError::Sms(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: TWILIO_API_BASE.to_string(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        })
    }

    /// Build from the `sms` section; fails if any Twilio credential is missing
    pub fn from_config(config: &SmsConfig) -> AppResult<Self> {
        let missing = |name: &str| AppError::Config(format!("sms.{} is not set", name));

        Self::new(
            config
                .twilio_account_sid
                .as_deref()
                .ok_or_else(|| missing("twilio_account_sid"))?,
            config
                .twilio_auth_token
                .as_deref()
                .ok_or_else(|| missing("twilio_auth_token"))?,
            config
                .twilio_from_number
                .as_deref()
                .ok_or_else(|| missing("twilio_from_number"))?,
            config.timeout_ms,
        )
    }

    /// Point at another API root (a local fake, for instance)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[async_trait]
impl SmsGateway for TwilioSmsGateway {
    #[instrument(skip(self, message))]
    async fn send(&self, to: &str, message: &str) -> AppResult<()> {
        debug!("Sending SMS via Twilio");

        let response = self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", message)])
            .send()
            .await
            .map_err(|e| {
                error!("Twilio request failed: {}", e);
                if e.is_timeout() {
                    AppError::Sms("Request timed out".to_string())
                } else {
                    AppError::Sms(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Twilio SMS failed: status={} body={}", status, body);
            return Err(AppError::Sms(format!("HTTP status {}", status.as_u16())));
        }

        info!("SMS sent to {}", to);
        Ok(())
    }
}

/// Logs messages instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogSmsGateway;

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, to: &str, message: &str) -> AppResult<()> {
        info!("[DEV MODE] SMS to {}: {}", to, message);
        Ok(())
    }
}
