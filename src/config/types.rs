use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

use crate::record::ListingStatus;

/// Main configuration structure for propscape
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
}

/// Harvest pipeline sizing and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum listing pages scanned per lane
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Bound on concurrent listing-page fetches
    #[serde(rename = "list-workers", default = "default_list_workers")]
    pub list_workers: usize,

    /// Number of detail-enrichment workers
    #[serde(rename = "detail-workers", default = "default_detail_workers")]
    pub detail_workers: usize,

    /// Politeness delay between pages within a lane
    #[serde(rename = "page-delay-ms", default = "default_delay")]
    pub page_delay_ms: DelayRange,

    /// Jitter before each detail fetch
    #[serde(rename = "detail-delay-ms", default = "default_delay")]
    pub detail_delay_ms: DelayRange,
}

/// Retry and timeout budget for a single fetch
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Attempts before a fetch is declared failed
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff base; attempt N waits base × N
    #[serde(rename = "backoff-base-secs", default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Per-attempt request timeout
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the date-stamped CSV sink
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Optional log file; when set, all workers funnel log lines here
    #[serde(rename = "log-file")]
    pub log_file: Option<String>,
}

/// One configured listing source.
///
/// The lane matrix is sources × statuses; a source takes part in a status
/// lane iff it configures a listing URL for that status.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Registry name selecting the extractor implementation
    pub name: String,

    /// Base URL used to absolutize relative links
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "rent-url")]
    pub rent_url: Option<String>,

    #[serde(rename = "sale-url")]
    pub sale_url: Option<String>,
}

impl SourceConfig {
    /// The (status, listing URL) lanes this source contributes.
    pub fn lanes(&self) -> Vec<(ListingStatus, &str)> {
        let mut lanes = Vec::new();
        if let Some(url) = &self.rent_url {
            lanes.push((ListingStatus::Rent, url.as_str()));
        }
        if let Some(url) = &self.sale_url {
            lanes.push((ListingStatus::Sale, url.as_str()));
        }
        lanes
    }
}

/// An inclusive uniform delay range in milliseconds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    /// Draws one delay uniformly from the range.
    pub fn sample(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min..=self.max);
        Duration::from_millis(ms)
    }
}

fn default_max_pages() -> u32 {
    20
}

fn default_list_workers() -> usize {
    20
}

fn default_detail_workers() -> usize {
    40
}

fn default_delay() -> DelayRange {
    DelayRange { min: 0, max: 1000 }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_base() -> u64 {
    5
}

fn default_timeout() -> u64 {
    30
}
