//! Lane scanning: the list phase
//!
//! A lane is one (source, status) scanning unit. Its page cursor only moves
//! forward: the first failed fetch or empty page halts the lane for good.

use crate::config::DelayRange;
use crate::extract::SourceExtractor;
use crate::harvest::enricher::EnrichHandle;
use crate::harvest::fetcher::{FetchPolicy, Fetcher};
use crate::record::ListingStatus;
use crate::sink::SinkHandle;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// One (source, status) scanning unit.
#[derive(Debug, Clone)]
pub struct Lane {
    /// Source name, for logs.
    pub source: String,
    pub status: ListingStatus,
    /// The configured first-page listing URL.
    pub listing_url: Url,
    /// Whether this lane's batches may carry the sink header.
    pub header_carrier: bool,
}

/// Everything a lane task needs besides the lane itself.
pub struct LaneContext {
    pub extractor: Arc<dyn SourceExtractor>,
    pub policy: FetchPolicy,
    pub max_pages: u32,
    pub page_delay: DelayRange,
    pub scrape_date: String,
    pub list_permits: Arc<Semaphore>,
    pub enricher: EnrichHandle,
    pub sink: SinkHandle,
}

/// Scans a lane's pages in order until the page cap, a failed fetch, or an
/// empty page. Returns the lane's phase-1 stub count.
pub async fn run_lane(lane: Lane, ctx: LaneContext) -> u64 {
    let mut fetcher = Fetcher::new(ctx.policy.clone());
    let mut total: u64 = 0;

    for page in 1..=ctx.max_pages {
        let url = page_url(&lane.listing_url, page);
        tracing::info!(
            source = %lane.source,
            status = %lane.status,
            page,
            "fetching listing page {url}"
        );

        let body = {
            let Ok(_permit) = ctx.list_permits.acquire().await else {
                // Pool closed; nothing more to scan.
                break;
            };
            match fetcher.fetch(url.as_str()).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        source = %lane.source,
                        status = %lane.status,
                        page,
                        "listing fetch failed, lane halts: {e}"
                    );
                    break;
                }
            }
        };

        let mut stubs = match ctx.extractor.parse_listing(&body) {
            Ok(stubs) => stubs,
            Err(e) => {
                tracing::warn!(
                    source = %lane.source,
                    status = %lane.status,
                    page,
                    "{e}"
                );
                Vec::new()
            }
        };
        if stubs.is_empty() {
            tracing::info!(
                source = %lane.source,
                status = %lane.status,
                page,
                "no listings, lane complete"
            );
            break;
        }

        for stub in &mut stubs {
            stub.stamp(lane.status, ctx.extractor.source_label(), &ctx.scrape_date);
        }
        total += stubs.len() as u64;

        let enriched = ctx.enricher.enrich_batch(stubs, &ctx.extractor).await;
        if let Err(e) = ctx.sink.submit(enriched, lane.header_carrier).await {
            tracing::error!(
                source = %lane.source,
                status = %lane.status,
                page,
                "failed to queue batch: {e}"
            );
        }

        if page < ctx.max_pages {
            tokio::time::sleep(ctx.page_delay.sample()).await;
        }
    }

    tracing::info!(
        source = %lane.source,
        status = %lane.status,
        total,
        "lane finished"
    );
    total
}

/// Builds the URL for a lane page. Page 1 is the configured URL untouched;
/// later pages append a `page` query pair.
pub fn page_url(base: &Url, page: u32) -> Url {
    if page <= 1 {
        return base.clone();
    }
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url
}
