//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Redis configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    /// Redis connection URL, required only for the redis OTP backend
    pub url: Option<String>,
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// Rider token lifetime in seconds
    #[serde(default = "default_rider_ttl")]
    pub rider_token_ttl_secs: i64,

    /// Driver token lifetime in seconds
    #[serde(default = "default_driver_ttl")]
    pub driver_token_ttl_secs: i64,

    /// Admin token lifetime in seconds
    #[serde(default = "default_admin_ttl")]
    pub admin_token_ttl_secs: i64,
}

fn default_rider_ttl() -> i64 {
    7 * 24 * 3600
}

fn default_driver_ttl() -> i64 {
    7 * 24 * 3600
}

fn default_admin_ttl() -> i64 {
    24 * 3600
}

/// Where one-time codes live
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OtpBackend {
    /// Process-local map
    #[default]
    Memory,
    /// Shared Redis keys
    Redis,
}

/// One-time code configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OtpConfig {
    /// Code lifetime in seconds
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: i64,

    /// Interval of the expiry sweep in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    #[serde(default)]
    pub backend: OtpBackend,
}

fn default_otp_ttl() -> i64 {
    600
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            backend: OtpBackend::Memory,
        }
    }
}

/// SMS gateway configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    /// Deliver codes through the gateway instead of the log
    #[serde(default)]
    pub production: bool,

    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,

    /// Prefix turning a local number into an international one
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Gateway request timeout in milliseconds
    #[serde(default = "default_sms_timeout")]
    pub timeout_ms: u64,
}

fn default_country_code() -> String {
    "+91".to_string()
}

fn default_sms_timeout() -> u64 {
    5000
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            production: false,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            country_code: default_country_code(),
            timeout_ms: default_sms_timeout(),
        }
    }
}

impl SmsConfig {
    /// Whether codes should actually be sent over SMS
    pub fn delivers_sms(&self) -> bool {
        self.production
            && self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
    }
}

/// Placeholder pricing policy bounds (upper bounds exclusive)
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_min_distance")]
    pub min_distance_km: i32,

    #[serde(default = "default_max_distance")]
    pub max_distance_km: i32,

    #[serde(default = "default_min_package")]
    pub min_package_price: i64,

    #[serde(default = "default_max_package")]
    pub max_package_price: i64,
}

fn default_min_distance() -> i32 {
    50
}

fn default_max_distance() -> i32 {
    300
}

fn default_min_package() -> i64 {
    1000
}

fn default_max_package() -> i64 {
    3000
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_distance_km: default_min_distance(),
            max_distance_km: default_max_distance(),
            min_package_price: default_min_package(),
            max_package_price: default_max_package(),
        }
    }
}

/// Status transition policy
#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Enforce the full transition table; false only guards cancellation
    #[serde(default = "default_strict")]
    pub strict_transitions: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strict_transitions: true,
        }
    }
}

/// How a booking and its dependent rows are written
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteStrategy {
    /// One database transaction with a savepoint around the payment
    #[default]
    Transactional,
    /// Sequential writes with compensating delete
    Compensating,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BookingConfig {
    #[serde(default)]
    pub write_strategy: WriteStrategy,
}

/// Sign-in attempt limits, counted per phone number or admin email
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed inside one window
    #[serde(default = "default_auth_max_attempts")]
    pub auth_max_attempts: u32,

    /// Sliding window length in seconds
    #[serde(default = "default_auth_window")]
    pub auth_window_secs: u64,
}

fn default_auth_max_attempts() -> u32 {
    10
}

fn default_auth_window() -> u64 {
    15 * 60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_max_attempts: default_auth_max_attempts(),
            auth_window_secs: default_auth_window(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("auth.rider_token_ttl_secs", default_rider_ttl())?
            .set_default("auth.driver_token_ttl_secs", default_driver_ttl())?
            .set_default("auth.admin_token_ttl_secs", default_admin_ttl())?
            .set_default("otp.ttl_secs", 600)?
            .set_default("otp.sweep_interval_secs", 60)?
            .set_default("otp.backend", "memory")?
            .set_default("sms.production", false)?
            .set_default("sms.country_code", "+91")?
            .set_default("pricing.min_distance_km", 50)?
            .set_default("pricing.max_distance_km", 300)?
            .set_default("pricing.min_package_price", 1000)?
            .set_default("pricing.max_package_price", 3000)?
            .set_default("dispatch.strict_transitions", true)?
            .set_default("booking.write_strategy", "transactional")?
            .set_default("rate_limit.auth_max_attempts", 10)?
            .set_default("rate_limit.auth_window_secs", 900)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with ZINGCAB_ prefix
            .add_source(
                Environment::with_prefix("ZINGCAB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("ZINGCAB").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_section_defaults() {
        let otp = OtpConfig::default();
        assert_eq!(otp.ttl_secs, 600);
        assert_eq!(otp.backend, OtpBackend::Memory);

        let pricing = PricingConfig::default();
        assert_eq!(pricing.min_distance_km, 50);
        assert_eq!(pricing.max_package_price, 3000);

        assert!(DispatchConfig::default().strict_transitions);

        let limits = RateLimitConfig::default();
        assert_eq!(limits.auth_max_attempts, 10);
        assert_eq!(limits.auth_window_secs, 900);
        assert_eq!(
            BookingConfig::default().write_strategy,
            WriteStrategy::Transactional
        );
    }

    #[test]
    fn test_sms_needs_production_and_credentials() {
        let mut sms = SmsConfig::default();
        assert!(!sms.delivers_sms());

        sms.production = true;
        assert!(!sms.delivers_sms());

        sms.twilio_account_sid = Some("AC123".to_string());
        sms.twilio_auth_token = Some("token".to_string());
        sms.twilio_from_number = Some("+15550000000".to_string());
        assert!(sms.delivers_sms());
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let raw = r#"
            [server]
            [database]
            url = "postgres://localhost/zingcab"
            [auth]
            jwt_secret = "secret"
            [otp]
            backend = "redis"
            [booking]
            write_strategy = "compensating"
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.admin_token_ttl_secs, 86400);
        assert_eq!(config.otp.backend, OtpBackend::Redis);
        assert_eq!(config.booking.write_strategy, WriteStrategy::Compensating);
        assert_eq!(config.sms.country_code, "+91");
        assert!(config.redis.url.is_none());
        assert_eq!(config.rate_limit.auth_window_secs, 900);
    }
}
