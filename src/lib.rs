//! Propscape: a concurrent property-listing harvester
//!
//! This crate implements a two-phase scraping pipeline: listing pages are
//! scanned lane-by-lane (one lane per source/status pair), discovered ads are
//! enriched with per-item detail lookups, and finished batches are serialized
//! through a single writer thread into an append-only CSV sink.

pub mod config;
pub mod extract;
pub mod harvest;
pub mod logging;
pub mod record;
pub mod sink;

use thiserror::Error;

/// Main error type for propscape operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sink::PersistenceError),

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

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

/// Errors from the resilient fetcher.
///
/// `RetriesExhausted` is the "no data" signal: callers degrade to an empty
/// page or an unenriched record and carry on. It is never fatal to a run.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("All {attempts} fetch attempts failed for {url}")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// Result type alias for propscape operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run_harvest, HarvestReport};
pub use record::{DetailFields, Listing, ListingStatus};
