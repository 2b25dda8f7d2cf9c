//! Cache store adapter over a [`Storage`] backend
//!
//! Reads and writes the single serialized [`CacheEnvelope`] under the
//! configured storage key.

use crate::cache::{
    clock::Clock,
    config::CorruptionPolicy,
    envelope::CacheEnvelope,
    storage::Storage,
    types::LocaleRecord,
};
use crate::error::{Result, TranslateError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Read/write access to the persisted envelope
///
/// Writes are read-modify-write cycles over the whole envelope. They are
/// serialized within one store; separate stores sharing a backend key still
/// race and the last writer wins.
pub struct CacheStore {
    storage: Arc<dyn Storage>,
    storage_key: String,
    policy: CorruptionPolicy,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl CacheStore {
    pub fn new(
        storage: Arc<dyn Storage>,
        storage_key: impl Into<String>,
        policy: CorruptionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            policy,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Current time according to the store's clock
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Load the envelope; absent state reads as empty
    pub async fn read(&self) -> Result<CacheEnvelope> {
        let Some(raw) = self.storage.get_item(&self.storage_key).await? else {
            return Ok(CacheEnvelope::default());
        };

        match CacheEnvelope::from_json(&raw) {
            Ok(envelope) => Ok(envelope),
            Err(e) => match self.policy {
                CorruptionPolicy::Reset => {
                    warn!(
                        "Discarding unreadable cache under '{}': {}",
                        self.storage_key, e
                    );
                    Ok(CacheEnvelope::default())
                }
                CorruptionPolicy::Surface => Err(TranslateError::CorruptCache {
                    storage_key: self.storage_key.clone(),
                    reason: e.to_string(),
                }),
            },
        }
    }

    /// Store `record` for `locale` and stamp the envelope with the current time
    pub async fn write(&self, locale: &str, record: LocaleRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut envelope = self.read().await?;
        let now = self.clock.now_millis();
        envelope.put(locale, record, now);

        let json = envelope.to_json()?;
        self.storage.set_item(&self.storage_key, json).await?;

        debug!(
            "Cached locale '{}' under '{}' ({} locales, time={})",
            locale,
            self.storage_key,
            envelope.locales.len(),
            now
        );
        Ok(())
    }

    /// Currently cached record for `locale`, ignoring freshness
    pub async fn snapshot(&self, locale: &str) -> Result<Option<LocaleRecord>> {
        Ok(self.read().await?.locales.remove(locale))
    }
}
