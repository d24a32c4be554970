//! Cache key constants and builders for ZingCab
//!
//! Provides standardized key naming patterns for everything kept in Redis.
//!
//! # Key Patterns
//!
//! - `otp:{phone_number}` - Live one-time code for a phone number
//! - `rate_limit:{key}` - Sorted set of recent attempt timestamps
//!
//! # Example
//!
//! ```
//! use zingcab_cache::keys;
//!
//! let key = keys::otp_key("9999999999");
//! assert_eq!(key, "otp:9999999999");
//! ```

/// Prefix for one-time codes
///
/// Format: `otp:{phone_number}`
pub const OTP_PREFIX: &str = "otp";

/// Build a cache key for the one-time code of a phone number
///
/// # Example
///
/// ```
/// use zingcab_cache::keys::otp_key;
///
/// let key = otp_key("9876543210");
/// assert_eq!(key, "otp:9876543210");
/// ```
pub fn otp_key(phone_number: &str) -> String {
    format!("{}:{}", OTP_PREFIX, phone_number)
}

/// Prefix for sign-in attempt windows
///
/// Format: `rate_limit:{key}`
pub const RATE_LIMIT_PREFIX: &str = "rate_limit";

pub fn rate_limit_key(key: &str) -> String {
    format!("{}:{}", RATE_LIMIT_PREFIX, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_key() {
        assert_eq!(otp_key("9999999999"), "otp:9999999999");
        assert_eq!(otp_key(""), "otp:");
    }

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(
            rate_limit_key("auth:rider:9999999999"),
            "rate_limit:auth:rider:9999999999"
        );
    }
}
