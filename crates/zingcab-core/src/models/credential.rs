//! One-time credential (OTP) model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A short-lived numeric code proving control of a phone number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub phone_number: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential valid for `ttl` from now
    pub fn new(phone_number: &str, code: String, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            phone_number: phone_number.to_string(),
            code,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Strictly after `expires_at` counts as expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, code: &str) -> bool {
        self.code == code
    }
}

/// Outcome of a single verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the credential has been consumed
    Verified,
    /// No live credential for this phone number
    NotFound,
    /// Credential was past its expiry; it has been removed
    Expired,
    /// Code differs; the credential is kept
    Mismatch,
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Verified)
    }

    /// Caller-facing reason text
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyOutcome::Verified => "OTP verified successfully",
            VerifyOutcome::NotFound => "OTP not found or expired",
            VerifyOutcome::Expired => "OTP expired",
            VerifyOutcome::Mismatch => "Invalid OTP",
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
