//! Remote translation source
//!
//! The transport is the caller's business. Anything implementing
//! [`TranslationLookup`] works, including plain async closures:
//!
//! ```rust
//! use translate_cache::cache::{LocaleRecord, LookupRequest, TranslationLookup};
//!
//! let lookup = |request: LookupRequest| async move {
//!     let mut record = LocaleRecord::new();
//!     record.insert("lang", serde_json::json!({ "code": request.language }));
//!     Ok::<_, translate_cache::TranslateError>(record)
//! };
//!
//! fn assert_lookup<L: TranslationLookup>(_: &L) {}
//! assert_lookup(&lookup);
//! ```

use crate::cache::types::{Locale, LocaleRecord};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

/// Arguments passed to the lookup function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupRequest {
    pub language: Locale,
}

impl LookupRequest {
    pub fn new(language: impl Into<Locale>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

/// Asynchronous source of authoritative locale records
#[async_trait]
pub trait TranslationLookup: Send + Sync {
    async fn lookup(&self, request: LookupRequest) -> Result<LocaleRecord>;
}

#[async_trait]
impl<F, Fut> TranslationLookup for F
where
    F: Fn(LookupRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<LocaleRecord>> + Send + 'static,
{
    async fn lookup(&self, request: LookupRequest) -> Result<LocaleRecord> {
        (self)(request).await
    }
}

/// Fixed in-memory source; unknown locales resolve to an empty record
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: HashMap<Locale, LocaleRecord>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<Locale>, record: LocaleRecord) -> Self {
        self.records.insert(locale.into(), record);
        self
    }
}

#[async_trait]
impl TranslationLookup for StaticLookup {
    async fn lookup(&self, request: LookupRequest) -> Result<LocaleRecord> {
        Ok(self
            .records
            .get(&request.language)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use serde_json::json;

    #[tokio::test]
    async fn test_closure_lookup() {
        let lookup = |request: LookupRequest| async move {
            if request.language == "xx" {
                return Err(TranslateError::Lookup("unsupported".to_string()));
            }
            Ok(LocaleRecord::from_iter([("lang", json!(request.language))]))
        };

        let record = lookup.lookup(LookupRequest::new("en")).await.unwrap();
        assert_eq!(record.get("lang"), Some(&json!("en")));

        assert!(lookup.lookup(LookupRequest::new("xx")).await.is_err());
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let en = LocaleRecord::from_iter([("a", json!({ "b": "c" }))]);
        let lookup = StaticLookup::new().with_locale("en", en.clone());

        assert_eq!(lookup.lookup(LookupRequest::new("en")).await.unwrap(), en);
        assert!(lookup.lookup(LookupRequest::new("fr")).await.unwrap().is_empty());
    }

    #[test]
    fn test_request_serializes_language_field() {
        let request = LookupRequest::new("zh-CN");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "language": "zh-CN" })
        );
    }
}
