//! # translate-cache
//!
//! Client-side caching for localized text fetched per locale from a remote
//! source.
//!
//! ## Features
//!
//! - Cached locale records served immediately while inside the expiry window
//! - Bundled override table merged under remote data (remote wins per leaf)
//! - Background revalidation of cache-served data with a second notification
//!   when the authoritative content changed
//! - Pluggable persistence (in-memory, one JSON file per storage key, or your own)
//! - Async-first design using tokio
//! - Revalidation failures reported to an injectable diagnostic sink
//!
//! ## Update Protocol
//!
//! ```no_run
//! use translate_cache::{LocaleRecord, LookupRequest, OverrideTable, TranslateManager, UpdatePhase};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = TranslateManager::builder()
//!         .overrides(OverrideTable::from_json(r#"{"en": {"menu": {"open": "Open"}}}"#)?)
//!         .lookup(|request: LookupRequest| async move {
//!             fetch_from_service(&request.language).await
//!         })
//!         .build()?;
//!
//!     let outcome = manager
//!         .update("en", |result, phase| match phase {
//!             UpdatePhase::First => println!("render {} keys", result.data.len()),
//!             UpdatePhase::Second => println!("re-render with updated strings"),
//!         })
//!         .await?;
//!
//!     if let Some(revalidation) = outcome.revalidation {
//!         println!("revalidation: {}", revalidation.join().await);
//!     }
//!     Ok(())
//! }
//!
//! async fn fetch_from_service(_language: &str) -> translate_cache::Result<LocaleRecord> {
//!     LocaleRecord::from_json(r#"{"menu": {"close": "Close"}}"#)
//! }
//! ```
//!
//! ## Configuration
//!
//! [`ManagerConfig::from_env`] reads `TRANSLATE_CACHE_STORAGE_KEY`,
//! `TRANSLATE_CACHE_EXPIRY_MS`, `TRANSLATE_CACHE_LOOKUP_TIMEOUT_MS` and
//! `TRANSLATE_CACHE_STRICT_CORRUPTION`, loading a `.env` file first.

pub mod cache;
pub mod error;

// Re-export main types for convenience
pub use cache::{
    CacheEnvelope, CacheStore, Clock, CorruptionPolicy, DiagnosticSink, FileStorage, Locale,
    LocaleRecord, LookupRequest, ManagerConfig, ManagerConfigBuilder, ManagerStats, ManualClock,
    MemoryStorage, OverrideTable, RevalidationEvent, RevalidationHandle, RevalidationOutcome,
    StaticLookup, Storage, SystemClock, TracingSink, TranslateManager, TranslateManagerBuilder,
    TranslationLookup, TranslationResult, UpdateOutcome, UpdatePhase,
};
pub use error::{Result, TranslateError};
