//! Demo: cached translations across restarts
//!
//! Simulates two application starts against a file-backed cache. The first
//! start fetches from the "remote" service; the second renders from the cache
//! immediately, then re-renders once revalidation sees the service's new copy.
//!
//! Run with:
//! ```
//! RUST_LOG=translate_cache=debug cargo run --example offline_catalog
//! ```

use anyhow::Result;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use translate_cache::{
    FileStorage, LocaleRecord, LookupRequest, ManagerConfig, OverrideTable, TranslateManager,
    TranslationResult, UpdatePhase,
};

/// Remote catalog whose content changes on every deploy
#[derive(Clone, Default)]
struct Service {
    version: Arc<AtomicU32>,
}

impl Service {
    async fn fetch(&self, language: &str) -> translate_cache::Result<LocaleRecord> {
        let version = self.version.load(Ordering::SeqCst);
        LocaleRecord::from_value(json!({
            "header": { "title": format!("Dashboard v{}", version) },
            "meta": { "language": language }
        }))
    }
}

fn render(result: &TranslationResult, phase: UpdatePhase) {
    println!(
        "  [{}] cached={} title={:?} logout={:?}",
        phase,
        result.is_cache,
        result.data.text("header", "title"),
        result.data.text("header", "logout"),
    );
}

fn manager(dir: &TempDir, service: Service) -> Result<TranslateManager> {
    let overrides = OverrideTable::from_json(
        r#"{"en": {"header": {"title": "Dashboard", "logout": "Sign out"}}}"#,
    )?;

    let manager = TranslateManager::builder()
        .config(ManagerConfig::from_env()?)
        .storage(FileStorage::new(dir.path()))
        .overrides(overrides)
        .lookup(move |request: LookupRequest| {
            let service = service.clone();
            async move { service.fetch(&request.language).await }
        })
        .build()?;
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir = TempDir::new()?;
    let service = Service::default();

    println!("First start (empty cache):");
    let first = manager(&dir, service.clone())?;
    first.update("en", render).await?;

    service.version.fetch_add(1, Ordering::SeqCst);

    println!("Second start (cached, service deployed a new catalog):");
    let second = manager(&dir, service.clone())?;
    let outcome = second.update("en", render).await?;

    if let Some(revalidation) = outcome.revalidation {
        println!("  revalidation: {}", revalidation.join().await);
    }

    println!("{}", second.stats());
    Ok(())
}
