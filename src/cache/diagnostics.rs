//! Reporting for background revalidation
//!
//! Revalidation runs detached from the `update` caller, so its outcome,
//! failures included, is delivered to a [`DiagnosticSink`].

use crate::cache::types::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// How a background revalidation ended
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevalidationOutcome {
    /// Remote data matched the cached snapshot; no second callback
    Unchanged,

    /// Remote data changed and the second callback fired
    Updated,

    /// Remote data changed but the merged result was empty; no second callback
    UpdatedEmpty,

    /// Lookup, storage or merge failed
    Failed(String),
}

impl RevalidationOutcome {
    /// Whether the second callback was delivered
    pub fn notified(&self) -> bool {
        matches!(self, RevalidationOutcome::Updated)
    }
}

impl std::fmt::Display for RevalidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevalidationOutcome::Unchanged => write!(f, "unchanged"),
            RevalidationOutcome::Updated => write!(f, "updated"),
            RevalidationOutcome::UpdatedEmpty => write!(f, "updated with empty data"),
            RevalidationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Record of one finished background revalidation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationEvent {
    /// Locale that was revalidated
    pub locale: Locale,

    /// How it ended
    pub outcome: RevalidationOutcome,

    /// When it finished
    pub timestamp: DateTime<Utc>,

    /// Wall time spent, in milliseconds
    pub elapsed_ms: u64,
}

impl RevalidationEvent {
    pub fn new(locale: impl Into<Locale>, outcome: RevalidationOutcome) -> Self {
        Self {
            locale: locale.into(),
            outcome,
            timestamp: Utc::now(),
            elapsed_ms: 0,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Receiver for revalidation events
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: &RevalidationEvent);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&RevalidationEvent) + Send + Sync,
{
    fn report(&self, event: &RevalidationEvent) {
        (self)(event)
    }
}

/// Default sink: failures at `warn`, everything else at `debug`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: &RevalidationEvent) {
        match &event.outcome {
            RevalidationOutcome::Failed(reason) => warn!(
                "Background revalidation for '{}' failed after {}ms: {}",
                event.locale, event.elapsed_ms, reason
            ),
            outcome => debug!(
                "Background revalidation for '{}' {} ({}ms)",
                event.locale, outcome, event.elapsed_ms
            ),
        }
    }
}
