//! Merge of remote translation data with the static override table
//!
//! For each key in the locale's override record the result holds
//! `{ ...override[key], ...remote[key] }`: overrides supply defaults and the
//! remote value wins on every leaf it defines. Keys only present remotely are
//! left alone. Applying the merge twice gives the same result as once.

use crate::cache::types::{OverrideTable, TranslationResult};
use crate::error::{Result, TranslateError};
use serde_json::Value;

/// One-level merge of an override value under a remote value
///
/// Objects are merged key by key with `remote` taking precedence. For any
/// other shape the remote value replaces the override outright. A missing or
/// `null` remote value leaves the override in place.
pub fn shallow_merge(fallback: &Value, remote: Option<&Value>) -> Value {
    match (fallback, remote) {
        (_, None) | (_, Some(Value::Null)) => fallback.clone(),
        (Value::Object(base), Some(Value::Object(top))) => {
            let mut merged = base.clone();
            for (key, value) in top {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (_, Some(remote)) => remote.clone(),
    }
}

/// Fold the override record for `locale` into `result.data`
///
/// Fails with [`TranslateError::MissingOverride`] when the table has no entry
/// for the locale, even if remote data exists.
pub fn merge_into(
    locale: &str,
    mut result: TranslationResult,
    overrides: &OverrideTable,
) -> Result<TranslationResult> {
    let table = overrides
        .get(locale)
        .ok_or_else(|| TranslateError::MissingOverride {
            locale: locale.to_string(),
        })?;

    for (key, fallback) in table.iter() {
        let merged = shallow_merge(fallback, result.data.get(key));
        result.data.insert(key.clone(), merged);
    }

    Ok(result)
}
