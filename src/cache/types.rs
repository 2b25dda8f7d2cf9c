//! Core type definitions for the translation cache

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Locale identifier (e.g. `"en"`, `"zh-CN"`)
pub type Locale = String;

/// Translation payload for a single locale
///
/// Maps a translation key to its value, normally a nested object of localized
/// strings. Key sets are data-driven, so this is a map rather than a struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleRecord(BTreeMap<String, Value>);

impl LocaleRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert an arbitrary JSON value into a record (must be an object)
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Get the value stored under a translation key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Check whether the record contains a translation key
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level translation keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no translation keys are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterate over translation keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Look up a nested string, e.g. `text("common", "greeting")`
    pub fn text(&self, key: &str, leaf: &str) -> Option<&str> {
        self.0.get(key)?.get(leaf)?.as_str()
    }
}

impl From<BTreeMap<String, Value>> for LocaleRecord {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for LocaleRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Statically bundled per-locale fallback translations
///
/// Immutable once handed to a manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable(BTreeMap<Locale, LocaleRecord>);

impl OverrideTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from a JSON object of `{ locale: record }`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a locale entry (builder style)
    pub fn with_locale(mut self, locale: impl Into<Locale>, record: LocaleRecord) -> Self {
        self.0.insert(locale.into(), record);
        self
    }

    /// Get the override record for a locale
    pub fn get(&self, locale: &str) -> Option<&LocaleRecord> {
        self.0.get(locale)
    }

    /// Locales covered by the table
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.0.keys()
    }
}

impl<K: Into<Locale>> FromIterator<(K, LocaleRecord)> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = (K, LocaleRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Result handed to the update callback
///
/// `is_cache` is true only when the data was served from a fresh cache hit.
/// On the network path it is false and is left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_cache: bool,
    pub data: LocaleRecord,
}

impl TranslationResult {
    /// Result served from the cache
    pub fn cached(data: LocaleRecord) -> Self {
        Self {
            is_cache: true,
            data,
        }
    }

    /// Result fetched from the remote source
    pub fn remote(data: LocaleRecord) -> Self {
        Self {
            is_cache: false,
            data,
        }
    }
}

/// Which notification the callback is receiving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePhase {
    /// Immediate notification with cached or freshly fetched data
    First,

    /// Follow-up after background revalidation found changed content
    Second,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePhase::First => write!(f, "first"),
            UpdatePhase::Second => write!(f, "second"),
        }
    }
}

/// Counters describing manager activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Fresh cache hits served without a lookup
    pub hits: u64,

    /// Reads that fell through to the lookup function
    pub misses: u64,

    /// Misses caused by an entry older than the expiry window
    pub expired: u64,

    /// Calls made to the lookup function
    pub lookups: u64,

    /// Background revalidations started
    pub revalidations: u64,

    /// Second callbacks delivered
    pub second_notifications: u64,

    /// Background revalidations that ended in an error
    pub revalidation_failures: u64,
}

impl ManagerStats {
    /// Cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for ManagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ManagerStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, lookups: {}, revalidations: {}, second_notifications: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.lookups,
            self.revalidations,
            self.second_notifications
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locale_record_text() {
        let record = LocaleRecord::from_value(json!({
            "common": { "greeting": "hi" },
            "flat": "value"
        }))
        .unwrap();

        assert_eq!(record.len(), 2);
        assert!(record.contains_key("flat"));
        assert!(!record.contains_key("greeting"));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["common", "flat"]);
        assert_eq!(record.text("common", "greeting"), Some("hi"));
        assert_eq!(record.text("common", "missing"), None);
        assert_eq!(record.text("flat", "anything"), None);
    }

    #[test]
    fn test_locale_record_rejects_non_object() {
        assert!(LocaleRecord::from_value(json!(["not", "an", "object"])).is_err());
        assert!(LocaleRecord::from_json("42").is_err());
    }

    #[test]
    fn test_override_table_from_json() {
        let table = OverrideTable::from_json(r#"{"en": {"menu": {"open": "Open"}}, "fr": {}}"#)
            .unwrap();

        assert!(table.get("en").is_some());
        assert!(table.get("fr").unwrap().is_empty());
        assert!(table.get("de").is_none());
        assert_eq!(table.locales().count(), 2);
    }

    #[test]
    fn test_result_serialization_omits_false_flag() {
        let remote = TranslationResult::remote(LocaleRecord::new());
        assert_eq!(serde_json::to_value(&remote).unwrap(), json!({ "data": {} }));

        let cached = TranslationResult::cached(LocaleRecord::new());
        assert_eq!(
            serde_json::to_value(&cached).unwrap(),
            json!({ "isCache": true, "data": {} })
        );
    }

    #[test]
    fn test_update_phase_display() {
        assert_eq!(UpdatePhase::First.to_string(), "first");
        assert_eq!(UpdatePhase::Second.to_string(), "second");
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = ManagerStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.hits = 3;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), 75.0);
        assert!(stats.to_string().contains("hits: 3"));
    }
}
