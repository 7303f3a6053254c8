//! Danmu-Harvest: a topic-driven bullet-comment harvester
//!
//! This crate discovers videos matching a search topic on a content platform,
//! harvests the bullet-comment streams attached to each video under bounded
//! concurrency and politeness constraints, and produces a ranked, filtered
//! summary of the most relevant comments.

pub mod client;
pub mod config;
pub mod discover;
pub mod filter;
pub mod harvest;
pub mod pipeline;
pub mod report;

use thiserror::Error;

/// Main error type for harvesting operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Retries exhausted for {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("JSON decode error for {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("Snapshot error for {path}: {source}")]
    Snapshot {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to resolve {id}: {reason}")]
    Resolution { id: String, reason: String },

    #[error("All {count} comment streams failed for {id}")]
    AllStreamsFailed { id: String, count: usize },

    #[error("Harvest task for {id} panicked: {message}")]
    TaskPanic { id: String, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if this error represents an exhausted-retry transport
    /// failure rather than a permanent request or resolution failure.
    ///
    /// Transient failures (timeouts, connection resets, 5xx, 429) are retried
    /// inside [`client::RateLimitedClient`]; by the time one escalates to a
    /// calling component the retry budget has already been spent, so callers
    /// use this classification only for reporting.
    pub fn is_transient(&self) -> bool {
        matches!(self, HarvestError::RetriesExhausted { .. })
    }
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

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvesting operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{RateLimitedClient, RetryPolicy};
pub use config::Config;
pub use harvest::{ContentId, ContentResult, HarvestOutcome, StreamId};
