//! # Stale-While-Revalidate Translation Cache
//!
//! Caches per-locale translation records fetched from a remote lookup,
//! merges them with bundled overrides and re-validates cache-served data in
//! the background.
//!
//! ## Components
//!
//! - **Storage** ([`Storage`]): raw key-value persistence (memory or files)
//! - **Cache store** ([`CacheStore`]): reads/writes the single [`CacheEnvelope`]
//! - **Freshness**: one shared `time` for the whole envelope, checked against
//!   the configured expiry window
//! - **Merge** ([`merge_into`]): overrides as per-key defaults, remote wins
//! - **Manager** ([`TranslateManager`]): the `update` protocol with at most two
//!   callbacks
//!
//! ## Example
//!
//! ```rust
//! use translate_cache::cache::{
//!     LocaleRecord, LookupRequest, ManagerConfig, OverrideTable, TranslateManager,
//! };
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let overrides = OverrideTable::from_json(
//!     r#"{"en": {"common": {"greeting": "hello", "farewell": "bye"}}}"#,
//! )?;
//!
//! let manager = TranslateManager::builder()
//!     .config(ManagerConfig::builder().expiry(Duration::from_secs(2 * 3600)).build())
//!     .overrides(overrides)
//!     .lookup(|_request: LookupRequest| async move {
//!         // Call the translation service for `_request.language` here
//!         LocaleRecord::from_json(r#"{"common": {"greeting": "hi"}}"#)
//!     })
//!     .build()?;
//!
//! manager
//!     .update("en", |result, phase| {
//!         println!("{} render, cached={}: {:?}", phase, result.is_cache, result.data);
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod envelope;
pub mod lookup;
pub mod manager;
pub mod merge;
pub mod storage;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CorruptionPolicy, ManagerConfig, ManagerConfigBuilder, DEFAULT_STORAGE_KEY};
pub use diagnostics::{DiagnosticSink, RevalidationEvent, RevalidationOutcome, TracingSink};
pub use envelope::CacheEnvelope;
pub use lookup::{LookupRequest, StaticLookup, TranslationLookup};
pub use manager::{
    RevalidationHandle, TranslateManager, TranslateManagerBuilder, UpdateCallback, UpdateOutcome,
};
pub use merge::{merge_into, shallow_merge};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::CacheStore;
pub use types::{
    Locale, LocaleRecord, ManagerStats, OverrideTable, TranslationResult, UpdatePhase,
};
