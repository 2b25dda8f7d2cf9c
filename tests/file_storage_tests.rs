//! File-backed persistence tests
//!
//! A cache written by one manager must be readable by a later one pointed at
//! the same directory, the way a page reload sees the previous session's
//! `localStorage`.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use translate_cache::{
    CacheEnvelope, FileStorage, LocaleRecord, LookupRequest, ManagerConfig, OverrideTable,
    RevalidationOutcome, Storage, TranslateManager,
};

fn overrides() -> OverrideTable {
    OverrideTable::new().with_locale(
        "en",
        LocaleRecord::from_value(json!({ "nav": { "home": "Home", "help": "Help" } })).unwrap(),
    )
}

fn manager_over(dir: &std::path::Path, calls: Arc<AtomicUsize>) -> TranslateManager {
    TranslateManager::builder()
        .config(ManagerConfig::builder().storage_key("app/i18n").build())
        .storage(FileStorage::new(dir))
        .overrides(overrides())
        .lookup(move |_request: LookupRequest| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                LocaleRecord::from_value(json!({ "nav": { "home": "Start" } }))
            }
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = manager_over(dir.path(), calls.clone());
    let outcome = first.update("en", |_, _| {}).await.unwrap();
    assert!(!outcome.result.is_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A fresh manager over the same directory starts from the persisted envelope
    let second = manager_over(dir.path(), calls.clone());
    let outcome = second.update("en", |_, _| {}).await.unwrap();

    assert!(outcome.result.is_cache);
    assert_eq!(outcome.result.data.text("nav", "home"), Some("Start"));
    assert_eq!(outcome.result.data.text("nav", "help"), Some("Help"));

    let revalidation = outcome.revalidation.unwrap().join().await;
    assert_eq!(revalidation, RevalidationOutcome::Unchanged);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persisted_layout() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_over(dir.path(), Arc::new(AtomicUsize::new(0)));
    manager.update("en", |_, _| {}).await.unwrap();

    let storage = FileStorage::new(dir.path());
    assert!(storage.path_for("app/i18n").exists());

    let raw = storage.get_item("app/i18n").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    // Raw remote data is cached; overrides are applied on read, not persisted
    assert_eq!(value["en"], json!({ "nav": { "home": "Start" } }));
    assert!(value["time"].is_i64());

    let envelope = CacheEnvelope::from_json(&raw).unwrap();
    assert_eq!(envelope.locales.len(), 1);
}
