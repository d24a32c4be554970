//! Redis-backed credential store
//!
//! Each code lives under `otp:{phone}` with a Redis TTL equal to its
//! lifetime, so passive expiry is handled by Redis itself. Verification runs
//! as one Lua script to keep compare-and-delete atomic across processes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Script};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use zingcab_core::{
    models::{Credential, VerifyOutcome},
    traits::CredentialStore,
    AppError, AppResult,
};

use crate::{keys, RedisCache};

/// Returns one of `verified`, `not_found`, `expired`, `mismatch`.
/// ARGV[1] = submitted code, ARGV[2] = now in epoch milliseconds.
const VERIFY_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
    return 'not_found'
end
local stored = cjson.decode(raw)
if tonumber(ARGV[2]) > tonumber(stored.expires_at_ms) then
    redis.call('DEL', KEYS[1])
    return 'expired'
end
if stored.code ~= ARGV[1] then
    return 'mismatch'
end
redis.call('DEL', KEYS[1])
return 'verified'
"#;

/// Wire format of a stored code
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    code: String,
    issued_at_ms: i64,
    expires_at_ms: i64,
}

impl From<&Credential> for StoredCredential {
    fn from(c: &Credential) -> Self {
        Self {
            code: c.code.clone(),
            issued_at_ms: c.issued_at.timestamp_millis(),
            expires_at_ms: c.expires_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
impl StoredCredential {
    fn into_credential(self, phone_number: &str) -> Option<Credential> {
        Some(Credential {
            phone_number: phone_number.to_string(),
            code: self.code,
            issued_at: millis_to_utc(self.issued_at_ms)?,
            expires_at: millis_to_utc(self.expires_at_ms)?,
        })
    }
}

#[cfg(test)]
fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;
    Utc.timestamp_millis_opt(ms).single()
}

fn parse_outcome(raw: &str) -> AppResult<VerifyOutcome> {
    match raw {
        "verified" => Ok(VerifyOutcome::Verified),
        "not_found" => Ok(VerifyOutcome::NotFound),
        "expired" => Ok(VerifyOutcome::Expired),
        "mismatch" => Ok(VerifyOutcome::Mismatch),
        other => Err(AppError::Cache(format!(
            "Unexpected verification result: {}",
            other
        ))),
    }
}

/// `CredentialStore` shared by every process pointing at the same Redis
#[derive(Clone)]
pub struct RedisCredentialStore {
    cache: RedisCache,
    verify_script: Script,
}

impl RedisCredentialStore {
    pub fn new(cache: RedisCache) -> Self {
        Self {
            cache,
            verify_script: Script::new(VERIFY_SCRIPT),
        }
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    #[instrument(skip(self, credential))]
    async fn put(&self, credential: Credential) -> AppResult<()> {
        let key = keys::otp_key(&credential.phone_number);
        let ttl_ms = (credential.expires_at - credential.issued_at)
            .num_milliseconds()
            .max(1) as u64;

        let json = serde_json::to_string(&StoredCredential::from(&credential)).map_err(|e| {
            error!("Failed to serialize credential: {}", e);
            AppError::Serialization(format!("Serialization failed: {}", e))
        })?;

        debug!("SET {} (TTL: {}ms)", key, ttl_ms);
        let mut conn = self.cache.connection();
        let _: () = conn
            .pset_ex(&key, json, ttl_ms)
            .await
            .map_err(RedisCache::map_redis_error)?;

        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn verify(
        &self,
        phone_number: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<VerifyOutcome> {
        let mut conn = self.cache.connection();

        let raw: String = self
            .verify_script
            .key(keys::otp_key(phone_number))
            .arg(code)
            .arg(now.timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(RedisCache::map_redis_error)?;

        let outcome = parse_outcome(&raw)?;
        debug!("Verification for {}: {:?}", phone_number, outcome);
        Ok(outcome)
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> AppResult<usize> {
        // Keys carry their own TTL
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stored_credential_round_trip() {
        let credential = Credential::new("9999999999", "482913".to_string(), Duration::minutes(10));
        let stored = StoredCredential::from(&credential);
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("expires_at_ms"));

        let back: StoredCredential = serde_json::from_str(&json).unwrap();
        let restored = back.into_credential("9999999999").unwrap();
        assert_eq!(restored.code, "482913");
        assert_eq!(
            restored.expires_at.timestamp_millis(),
            credential.expires_at.timestamp_millis()
        );
    }

    #[test]
    fn test_parse_outcome() {
        assert_eq!(parse_outcome("verified").unwrap(), VerifyOutcome::Verified);
        assert_eq!(parse_outcome("mismatch").unwrap(), VerifyOutcome::Mismatch);
        assert!(parse_outcome("weird").is_err());
    }

    async fn setup_store() -> RedisCredentialStore {
        let cache = RedisCache::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");
        cache.flush_db().await.expect("Failed to flush DB");
        RedisCredentialStore::new(cache)
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_single_use_verification() {
        let store = setup_store().await;
        let credential = Credential::new("9999999999", "123456".to_string(), Duration::minutes(10));
        store.put(credential).await.unwrap();

        let now = Utc::now();
        assert_eq!(
            store.verify("9999999999", "000000", now).await.unwrap(),
            VerifyOutcome::Mismatch
        );
        assert_eq!(
            store.verify("9999999999", "123456", now).await.unwrap(),
            VerifyOutcome::Verified
        );
        assert_eq!(
            store.verify("9999999999", "123456", now).await.unwrap(),
            VerifyOutcome::NotFound
        );
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_expired_code_removed() {
        let store = setup_store().await;
        let credential = Credential::new("9999999998", "123456".to_string(), Duration::minutes(10));
        let later = credential.expires_at + Duration::seconds(1);
        store.put(credential).await.unwrap();

        assert_eq!(
            store.verify("9999999998", "123456", later).await.unwrap(),
            VerifyOutcome::Expired
        );
        assert_eq!(
            store.verify("9999999998", "123456", Utc::now()).await.unwrap(),
            VerifyOutcome::NotFound
        );
    }
}
