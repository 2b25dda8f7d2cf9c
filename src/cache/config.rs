//! Configuration for the translation manager

use crate::error::{Result, TranslateError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Persistence namespace used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "TranslateManager";

/// Environment variable names read by [`ManagerConfig::from_env`]
pub const ENV_STORAGE_KEY: &str = "TRANSLATE_CACHE_STORAGE_KEY";
pub const ENV_EXPIRY_MS: &str = "TRANSLATE_CACHE_EXPIRY_MS";
pub const ENV_LOOKUP_TIMEOUT_MS: &str = "TRANSLATE_CACHE_LOOKUP_TIMEOUT_MS";
pub const ENV_STRICT_CORRUPTION: &str = "TRANSLATE_CACHE_STRICT_CORRUPTION";

/// What to do when the persisted envelope cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptionPolicy {
    /// Treat the cache as empty and carry on; the next write replaces the blob
    #[default]
    Reset,

    /// Fail reads and writes with `TranslateError::CorruptCache`
    Surface,
}

/// Configuration for the translation manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Namespace of the single persisted envelope
    pub storage_key: String,

    /// Freshness window for the whole envelope; `None` never expires
    pub expiry: Option<Duration>,

    /// Upper bound on a single lookup call; `None` waits forever
    pub lookup_timeout: Option<Duration>,

    /// Handling of malformed persisted state
    pub corruption_policy: CorruptionPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            expiry: None,
            lookup_timeout: None,
            corruption_policy: CorruptionPolicy::Reset,
        }
    }
}

impl ManagerConfig {
    /// Create a new builder for manager configuration
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(TranslateError::Config(
                "storage_key must not be empty".to_string(),
            ));
        }

        if self.lookup_timeout == Some(Duration::ZERO) {
            return Err(TranslateError::Config(
                "lookup_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(key) = var(ENV_STORAGE_KEY) {
            builder = builder.storage_key(key);
        }
        if let Some(ms) = var(ENV_EXPIRY_MS) {
            builder = builder.expiry(Duration::from_millis(parse_millis(ENV_EXPIRY_MS, &ms)?));
        }
        if let Some(ms) = var(ENV_LOOKUP_TIMEOUT_MS) {
            builder = builder.lookup_timeout(Duration::from_millis(parse_millis(
                ENV_LOOKUP_TIMEOUT_MS,
                &ms,
            )?));
        }
        if let Some(flag) = var(ENV_STRICT_CORRUPTION) {
            let strict = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            if strict {
                builder = builder.corruption_policy(CorruptionPolicy::Surface);
            }
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        TranslateError::Config(format!("{} must be a number of milliseconds: {}", name, e))
    })
}

/// Builder for manager configuration
#[derive(Debug, Default)]
pub struct ManagerConfigBuilder {
    storage_key: Option<String>,
    expiry: Option<Duration>,
    lookup_timeout: Option<Duration>,
    corruption_policy: Option<CorruptionPolicy>,
}

impl ManagerConfigBuilder {
    /// Set the persistence namespace
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Set the freshness window; zero means the cache never expires
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = (!expiry.is_zero()).then_some(expiry);
        self
    }

    /// Set the freshness window in milliseconds
    pub fn expiry_ms(self, millis: u64) -> Self {
        self.expiry(Duration::from_millis(millis))
    }

    /// Bound each lookup call
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Choose how corrupt persisted state is handled
    pub fn corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.corruption_policy = Some(policy);
        self
    }

    /// Build the manager configuration
    pub fn build(self) -> ManagerConfig {
        let defaults = ManagerConfig::default();

        ManagerConfig {
            storage_key: self.storage_key.unwrap_or(defaults.storage_key),
            expiry: self.expiry.or(defaults.expiry),
            lookup_timeout: self.lookup_timeout.or(defaults.lookup_timeout),
            corruption_policy: self
                .corruption_policy
                .unwrap_or(defaults.corruption_policy),
        }
    }
}
