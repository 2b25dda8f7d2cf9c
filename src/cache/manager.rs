//! Update orchestration: cache freshness, override merge and double notify
//!
//! [`TranslateManager::update`] is the entry point:
//!
//! 1. serve the locale from the cache when fresh, otherwise call the lookup
//!    and write the result through;
//! 2. merge the static overrides under it;
//! 3. invoke the callback with [`UpdatePhase::First`];
//! 4. if the data came from the cache, spawn a background revalidation that
//!    re-fetches, compares against the cached snapshot and, when the content
//!    changed, invokes the callback again with [`UpdatePhase::Second`].
//!
//! The callback therefore fires at most twice per `update`, and `Second`
//! only ever follows a cache-served `First`.

use crate::cache::{
    clock::{Clock, SystemClock},
    config::ManagerConfig,
    diagnostics::{DiagnosticSink, RevalidationEvent, RevalidationOutcome, TracingSink},
    envelope::CacheEnvelope,
    lookup::{LookupRequest, TranslationLookup},
    merge::merge_into,
    storage::{MemoryStorage, Storage},
    store::CacheStore,
    types::{LocaleRecord, ManagerStats, OverrideTable, TranslationResult, UpdatePhase},
};
use crate::error::{Result, TranslateError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Callback invoked with merged data and the notification phase
pub type UpdateCallback = Arc<dyn Fn(&TranslationResult, UpdatePhase) + Send + Sync>;

/// Caching façade over a remote translation lookup
///
/// Cheap to clone; clones share the lookup, cache store and counters.
#[derive(Clone)]
pub struct TranslateManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: ManagerConfig,
    lookup: RwLock<Option<Arc<dyn TranslationLookup>>>,
    overrides: OverrideTable,
    store: CacheStore,
    sink: Arc<dyn DiagnosticSink>,
    stats: StatsCounters,
}

#[derive(Default)]
struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    lookups: AtomicU64,
    revalidations: AtomicU64,
    second_notifications: AtomicU64,
    revalidation_failures: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ManagerStats {
        ManagerStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            revalidations: self.revalidations.load(Ordering::Relaxed),
            second_notifications: self.second_notifications.load(Ordering::Relaxed),
            revalidation_failures: self.revalidation_failures.load(Ordering::Relaxed),
        }
    }
}

/// What `update` hands back once the first callback has run
#[derive(Debug)]
pub struct UpdateOutcome {
    /// The merged result passed to the first callback
    pub result: TranslationResult,

    /// Background revalidation, present only for cache-served results
    pub revalidation: Option<RevalidationHandle>,
}

/// Handle to a detached background revalidation
///
/// Dropping it does not cancel the task.
#[derive(Debug)]
pub struct RevalidationHandle {
    handle: JoinHandle<RevalidationOutcome>,
}

impl RevalidationHandle {
    /// Wait for the revalidation to finish
    pub async fn join(self) -> RevalidationOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => RevalidationOutcome::Failed(format!("revalidation task aborted: {}", e)),
        }
    }

    /// True once the task has completed or been aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the revalidation; a second callback will not fire afterwards
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl TranslateManager {
    /// Create a builder for a manager
    pub fn builder() -> TranslateManagerBuilder {
        TranslateManagerBuilder::default()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.inner.overrides
    }

    /// Install or replace the lookup function
    pub async fn set_lookup(&self, lookup: impl TranslationLookup + 'static) {
        *self.inner.lookup.write().await = Some(Arc::new(lookup));
        debug!("Lookup function replaced");
    }

    pub async fn has_lookup(&self) -> bool {
        self.inner.lookup.read().await.is_some()
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> ManagerStats {
        self.inner.stats.snapshot()
    }

    /// Current persisted envelope
    pub async fn envelope(&self) -> Result<CacheEnvelope> {
        self.inner.store.read().await
    }

    /// Serve `locale` from a fresh cache entry, or fetch and write it through
    pub async fn fetch_fresh(&self, locale: &str) -> Result<TranslationResult> {
        let envelope = self.inner.store.read().await?;
        let now = self.inner.store.now_millis();
        let expiry = self.inner.config.expiry;

        if let Some(record) = envelope.fresh_record(locale, now, expiry) {
            StatsCounters::bump(&self.inner.stats.hits);
            debug!("Cache hit for locale '{}'", locale);
            return Ok(TranslationResult::cached(record.clone()));
        }

        StatsCounters::bump(&self.inner.stats.misses);
        if envelope.record(locale).is_some() && envelope.time.is_some() {
            StatsCounters::bump(&self.inner.stats.expired);
            debug!("Cache entry for locale '{}' expired", locale);
        } else {
            debug!("Cache miss for locale '{}'", locale);
        }

        let record = self.fetch_remote(locale).await?;
        Ok(TranslationResult::remote(record))
    }

    /// Re-fetch `locale` and report whether it differs from the cached copy
    ///
    /// Always calls the lookup and writes the result through. Comparison is
    /// structural, so key order in the remote payload does not matter. A
    /// locale with no cached copy counts as changed.
    pub async fn needs_update(&self, locale: &str) -> Result<bool> {
        let snapshot = self.inner.store.snapshot(locale).await?;
        let fresh = self.fetch_remote(locale).await?;

        let changed = snapshot.as_ref() != Some(&fresh);
        debug!(
            "Revalidated locale '{}': {}",
            locale,
            if changed { "changed" } else { "unchanged" }
        );
        Ok(changed)
    }

    /// Fold the static overrides for `locale` into `result`
    pub fn merge(&self, locale: &str, result: TranslationResult) -> Result<TranslationResult> {
        merge_into(locale, result, &self.inner.overrides)
    }

    /// Fetch, merge and notify; see the module docs for the full protocol
    ///
    /// Returns after the first callback. Failures of the background
    /// revalidation never reach the caller; they go to the diagnostic sink.
    /// Must be called from within a tokio runtime.
    pub async fn update<F>(&self, locale: &str, callback: F) -> Result<UpdateOutcome>
    where
        F: Fn(&TranslationResult, UpdatePhase) + Send + Sync + 'static,
    {
        let callback: UpdateCallback = Arc::new(callback);

        let result = self.fetch_merged(locale).await?;
        if result.data.is_empty() {
            return Err(TranslateError::EmptyLocale {
                locale: locale.to_string(),
            });
        }

        callback(&result, UpdatePhase::First);

        let revalidation = if result.is_cache {
            Some(self.spawn_revalidation(locale.to_string(), callback))
        } else {
            None
        };

        Ok(UpdateOutcome {
            result,
            revalidation,
        })
    }

    async fn fetch_merged(&self, locale: &str) -> Result<TranslationResult> {
        let result = self.fetch_fresh(locale).await?;
        self.merge(locale, result)
    }

    /// Call the lookup and write its result through the cache store
    async fn fetch_remote(&self, locale: &str) -> Result<LocaleRecord> {
        let lookup = self
            .inner
            .lookup
            .read()
            .await
            .clone()
            .ok_or(TranslateError::MissingLookup)?;

        StatsCounters::bump(&self.inner.stats.lookups);
        let request = LookupRequest::new(locale);

        let record = match self.inner.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup.lookup(request))
                .await
                .map_err(|_| TranslateError::LookupTimeout {
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    locale: locale.to_string(),
                })??,
            None => lookup.lookup(request).await?,
        };

        self.inner.store.write(locale, record.clone()).await?;
        Ok(record)
    }

    fn spawn_revalidation(&self, locale: String, callback: UpdateCallback) -> RevalidationHandle {
        let manager = self.clone();
        StatsCounters::bump(&self.inner.stats.revalidations);

        let handle = tokio::spawn(async move {
            let started = Instant::now();

            let outcome = match manager.revalidate(&locale, &callback).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    StatsCounters::bump(&manager.inner.stats.revalidation_failures);
                    RevalidationOutcome::Failed(e.to_string())
                }
            };

            let event = RevalidationEvent::new(locale, outcome.clone()).with_elapsed(started.elapsed());
            manager.inner.sink.report(&event);
            outcome
        });

        RevalidationHandle { handle }
    }

    /// The second leg: compare, then re-run fetch + merge when changed
    ///
    /// `needs_update` has just rewritten the cache, so the re-run is normally
    /// served from the cache rather than making another network call.
    async fn revalidate(&self, locale: &str, callback: &UpdateCallback) -> Result<RevalidationOutcome> {
        if !self.needs_update(locale).await? {
            return Ok(RevalidationOutcome::Unchanged);
        }

        let result = self.fetch_merged(locale).await?;
        if result.data.is_empty() {
            return Ok(RevalidationOutcome::UpdatedEmpty);
        }

        callback(&result, UpdatePhase::Second);
        StatsCounters::bump(&self.inner.stats.second_notifications);
        Ok(RevalidationOutcome::Updated)
    }
}

/// Builder for [`TranslateManager`]
#[derive(Default)]
pub struct TranslateManagerBuilder {
    config: Option<ManagerConfig>,
    lookup: Option<Arc<dyn TranslationLookup>>,
    overrides: Option<OverrideTable>,
    storage: Option<Arc<dyn Storage>>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl TranslateManagerBuilder {
    /// Use a complete configuration
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the lookup function (can also be installed later with `set_lookup`)
    pub fn lookup(mut self, lookup: impl TranslationLookup + 'static) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    /// Set the static override table
    pub fn overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Set the persistence backend (defaults to [`MemoryStorage`])
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Share an existing persistence backend
    pub fn shared_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the time source (defaults to [`SystemClock`])
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the revalidation event sink (defaults to [`TracingSink`])
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Validate the configuration and build the manager
    pub fn build(self) -> Result<TranslateManager> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        info!("Initializing translate manager with config: {:?}", config);

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = CacheStore::new(
            storage,
            config.storage_key.clone(),
            config.corruption_policy,
            clock,
        );

        Ok(TranslateManager {
            inner: Arc::new(ManagerInner {
                config,
                lookup: RwLock::new(self.lookup),
                overrides: self.overrides.unwrap_or_default(),
                store,
                sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
                stats: StatsCounters::default(),
            }),
        })
    }
}
