//! Persisted cache envelope with a single shared timestamp
//!
//! Layout on disk: `{ "<locale>": { ... }, "time": <epoch ms> }`.
//!
//! `time` belongs to the whole envelope, not to a locale. Writing any locale
//! refreshes every cached locale. A locale literally named `time` cannot be
//! cached.

use crate::cache::types::{Locale, LocaleRecord};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// All cached locales plus the time of the last write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// Epoch milliseconds of the most recent write, for any locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    /// Cached records keyed by locale
    #[serde(flatten)]
    pub locales: BTreeMap<Locale, LocaleRecord>,
}

impl CacheEnvelope {
    /// Parse a persisted envelope
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Cached record for a locale, fresh or not
    pub fn record(&self, locale: &str) -> Option<&LocaleRecord> {
        self.locales.get(locale)
    }

    /// Milliseconds since the last write, if the envelope was ever written
    ///
    /// Saturates, so an out-of-range persisted `time` reads as very old (or
    /// very new) instead of overflowing.
    pub fn age_millis(&self, now: i64) -> Option<i64> {
        self.time.map(|time| now.saturating_sub(time))
    }

    /// Whether the shared timestamp is inside the expiry window
    ///
    /// A `None` or zero expiry never goes stale. An age of exactly `expiry`
    /// is fresh.
    pub fn is_fresh(&self, now: i64, expiry: Option<Duration>) -> bool {
        let Some(age) = self.age_millis(now) else {
            return false;
        };

        match expiry.filter(|window| !window.is_zero()) {
            None => true,
            Some(window) => age <= 0 || (age as u128) <= window.as_millis(),
        }
    }

    /// Cached record for a locale, only if present and fresh
    pub fn fresh_record(
        &self,
        locale: &str,
        now: i64,
        expiry: Option<Duration>,
    ) -> Option<&LocaleRecord> {
        if !self.is_fresh(now, expiry) {
            return None;
        }
        self.record(locale)
    }

    /// Replace a locale's record and stamp the whole envelope
    pub fn put(&mut self, locale: impl Into<Locale>, record: LocaleRecord, now: i64) {
        self.locales.insert(locale.into(), record);
        self.time = Some(now);
    }

    /// True when nothing has been cached
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty() && self.time.is_none()
    }
}
