//! Harvesting pipeline
//!
//! This module contains the concurrent core:
//! - HTTP fetching with retry and linear backoff
//! - lane scanning over listing pages (phase 1)
//! - detail enrichment workers (phase 2)
//! - run orchestration and the shutdown protocol

mod enricher;
mod fetcher;
mod lane;
mod orchestrator;

pub use enricher::{EnrichHandle, EnrichPool};
pub use fetcher::{build_http_client, FetchPolicy, Fetcher};
pub use lane::{page_url, run_lane, Lane, LaneContext};
pub use orchestrator::{build_lanes, run_harvest, HarvestReport};
