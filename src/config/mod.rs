//! Configuration module for propscape
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All configuration is startup-only; nothing here mutates at runtime.
//!
//! # Example
//!
//! ```no_run
//! use propscape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Scanning up to {} pages per lane", config.harvest.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DelayRange, FetchConfig, HarvestConfig, OutputConfig, SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
