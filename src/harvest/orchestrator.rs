//! Run orchestration
//!
//! Builds the lane matrix, fans lanes out over the worker pools, and drives
//! the shutdown protocol: once every lane has finished, the enrichment pool
//! is drained, the sentinel is queued, and the writer thread is joined before
//! the run is declared complete.

use crate::config::Config;
use crate::extract;
use crate::harvest::enricher::EnrichPool;
use crate::harvest::fetcher::FetchPolicy;
use crate::harvest::lane::{run_lane, Lane, LaneContext};
use crate::sink::SinkWriter;
use crate::{ConfigError, HarvestError};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Aggregate counts for one completed run.
#[derive(Debug)]
pub struct HarvestReport {
    /// Ads discovered by the list phase, summed over lanes.
    pub ads_found: u64,
    /// Rows the writer actually appended (lost batches under-report here).
    pub rows_written: u64,
    /// Lanes in the matrix.
    pub lanes: usize,
    pub sink_path: PathBuf,
}

/// Drives a full harvest run to completion.
///
/// Never fails after startup: fetch, parse, and persistence failures degrade
/// to under-counts and placeholder fields. The only fatal errors are
/// configuration and sink-spawn problems before any lane starts.
pub async fn run_harvest(config: Config) -> Result<HarvestReport, HarvestError> {
    let scrape_date = Local::now().format("%Y-%m-%d").to_string();

    let data_dir = PathBuf::from(&config.output.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let sink_path = data_dir.join(format!("property_data_{scrape_date}.csv"));

    let policy = FetchPolicy::from(&config.fetch);
    let writer = SinkWriter::spawn(sink_path.clone())?;
    let enrich_pool = EnrichPool::spawn(
        config.harvest.detail_workers,
        policy.clone(),
        config.harvest.detail_delay_ms,
    );
    let list_permits = Arc::new(Semaphore::new(config.harvest.list_workers));

    let lanes = build_lanes(&config)?;
    let lane_count = lanes.len();
    tracing::info!(
        lanes = lane_count,
        sink = %sink_path.display(),
        "starting harvest"
    );

    let mut tasks = JoinSet::new();
    for (lane, extractor) in lanes {
        let ctx = LaneContext {
            extractor,
            policy: policy.clone(),
            max_pages: config.harvest.max_pages,
            page_delay: config.harvest.page_delay_ms,
            scrape_date: scrape_date.clone(),
            list_permits: Arc::clone(&list_permits),
            enricher: enrich_pool.handle(),
            sink: writer.handle(),
        };
        tasks.spawn(run_lane(lane, ctx));
    }

    let mut ads_found: u64 = 0;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(count) => ads_found += count,
            Err(e) => tracing::error!("lane task failed: {e}"),
        }
    }

    // All producers are done: drain the detail workers, then stop the writer
    // with the sentinel and wait for it before reporting.
    enrich_pool.shutdown().await;
    let rows_written = tokio::task::spawn_blocking(move || writer.finish())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("failed to join sink writer: {e}");
            0
        });

    tracing::info!(ads_found, rows_written, "harvest complete");

    Ok(HarvestReport {
        ads_found,
        rows_written,
        lanes: lane_count,
        sink_path,
    })
}

/// Builds the lane matrix: configured sources × their configured statuses.
/// The first lane is the run's header carrier.
pub fn build_lanes(
    config: &Config,
) -> Result<Vec<(Lane, Arc<dyn extract::SourceExtractor>)>, ConfigError> {
    let mut lanes = Vec::new();

    for source in &config.sources {
        let base_url = Url::parse(&source.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("base-url '{}': {e}", source.base_url)))?;
        let extractor = extract::extractor_for(&source.name, &base_url)
            .ok_or_else(|| ConfigError::UnknownSource(source.name.clone()))?;

        for (status, url) in source.lanes() {
            let listing_url = Url::parse(url).map_err(|e| {
                ConfigError::InvalidUrl(format!("{status} URL '{url}' for '{}': {e}", source.name))
            })?;
            lanes.push((
                Lane {
                    source: source.name.clone(),
                    status,
                    listing_url,
                    header_carrier: lanes.is_empty(),
                },
                Arc::clone(&extractor),
            ));
        }
    }

    Ok(lanes)
}
