//! Error types for translation cache operations
//!
//! Every fallible operation in the crate returns [`Result`]. Failures inside the
//! background revalidation task never surface here; they are routed to the
//! configured [`DiagnosticSink`](crate::cache::DiagnosticSink) instead.

use thiserror::Error;

/// Main error type for translation cache operations
#[derive(Error, Debug)]
pub enum TranslateError {
    /// No lookup function has been configured
    #[error("No lookup function configured: call set_lookup before update")]
    MissingLookup,

    /// Neither the remote source nor the override table produced any keys
    #[error("Locale empty: no translation data for '{locale}'")]
    EmptyLocale { locale: String },

    /// The requested locale has no entry in the static override table
    #[error("Locale '{locale}' has no entry in the static override table")]
    MissingOverride { locale: String },

    /// The lookup function failed
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// The lookup function did not settle in time
    #[error("Lookup timed out after {timeout_ms}ms for locale '{locale}'")]
    LookupTimeout { timeout_ms: u64, locale: String },

    /// The persisted envelope could not be parsed and the strict policy is active
    #[error("Corrupt cache under key '{storage_key}': {reason}")]
    CorruptCache { storage_key: String, reason: String },

    /// Local persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for translation cache operations
pub type Result<T> = std::result::Result<T, TranslateError>;

impl From<String> for TranslateError {
    fn from(s: String) -> Self {
        TranslateError::Other(s)
    }
}

impl From<&str> for TranslateError {
    fn from(s: &str) -> Self {
        TranslateError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(e: serde_json::Error) -> Self {
        TranslateError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for TranslateError {
    fn from(e: std::io::Error) -> Self {
        TranslateError::Storage(e.to_string())
    }
}
