//! Process-local credential store
//!
//! One map guarded by a `parking_lot::Mutex`. The lock is held for the whole
//! check-and-delete in `verify`, so a code can be consumed at most once even
//! under concurrent requests. Nothing here survives a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use zingcab_core::{
    models::{Credential, VerifyOutcome},
    traits::CredentialStore,
    AppResult,
};

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<HashMap<String, Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries (expired but unswept ones included)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Current code for a phone number
    pub fn peek(&self, phone_number: &str) -> Option<Credential> {
        self.entries.lock().get(phone_number).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn put(&self, credential: Credential) -> AppResult<()> {
        let mut entries = self.entries.lock();
        if entries
            .insert(credential.phone_number.clone(), credential)
            .is_some()
        {
            debug!("Replaced previous OTP");
        }
        Ok(())
    }

    async fn verify(
        &self,
        phone_number: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<VerifyOutcome> {
        let mut entries = self.entries.lock();

        let outcome = match entries.get(phone_number) {
            None => VerifyOutcome::NotFound,
            Some(c) if c.is_expired_at(now) => VerifyOutcome::Expired,
            Some(c) if !c.matches(code) => VerifyOutcome::Mismatch,
            Some(_) => VerifyOutcome::Verified,
        };

        if matches!(outcome, VerifyOutcome::Expired | VerifyOutcome::Verified) {
            entries.remove(phone_number);
        }

        Ok(outcome)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, c| !c.is_expired_at(now));
        Ok(before - entries.len())
    }
}
