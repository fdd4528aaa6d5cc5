//! Snowline: a batched snow-report acquisition pipeline
//!
//! This crate fetches ski-resort report pages, extracts structured snow facts
//! from their free-text content through a chat-completions backend, and upserts
//! the resulting records into a hosted table store. Failures are isolated per
//! URL: no fetch, extraction, or persistence fault aborts the run.

pub mod config;
pub mod pipeline;
pub mod report;
pub mod store;

use thiserror::Error;

/// Main error type for Snowline operations
///
/// These are the faults that can terminate the process; they all occur during
/// startup, before any batch begins. Per-item failures inside a run are carried
/// as [`report::StageFailure`] outcome values instead.
#[derive(Debug, Error)]
pub enum SnowlineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read URL list from {path}: {source}")]
    UrlList {
        path: String,
        source: std::io::Error,
    },

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Snowline operations
pub type Result<T> = std::result::Result<T, SnowlineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use report::{PageContent, PageOutcome, ResortReport, StageFailure};
