//! Detail enrichment pool
//!
//! A fixed set of worker tasks drains enrichment jobs from a bounded channel.
//! Each worker owns one `Fetcher`, so detail lookups reuse a connection pool
//! per worker. A stub that cannot be enriched (fetch exhausted, parse came
//! up empty, pool unavailable) is returned unchanged, never dropped.

use crate::config::DelayRange;
use crate::extract::SourceExtractor;
use crate::harvest::fetcher::{FetchPolicy, Fetcher};
use crate::record::Listing;
use std::sync::Arc;
use tokio::task::JoinHandle;

struct EnrichJob {
    stub: Listing,
    extractor: Arc<dyn SourceExtractor>,
    reply: flume::Sender<Listing>,
}

/// Handle lanes use to enrich a page's stubs.
#[derive(Clone)]
pub struct EnrichHandle {
    job_tx: flume::Sender<EnrichJob>,
}

impl EnrichHandle {
    /// Enriches a batch of stubs, returning them in completion order.
    ///
    /// Every stub that goes in comes back out: enrichment failures keep the
    /// stub's placeholder fields intact.
    pub async fn enrich_batch(
        &self,
        stubs: Vec<Listing>,
        extractor: &Arc<dyn SourceExtractor>,
    ) -> Vec<Listing> {
        let expected = stubs.len();
        let (reply_tx, reply_rx) = flume::bounded(expected.max(1));

        let mut enriched = Vec::with_capacity(expected);
        for stub in stubs {
            let job = EnrichJob {
                stub,
                extractor: Arc::clone(extractor),
                reply: reply_tx.clone(),
            };
            if let Err(send_error) = self.job_tx.send_async(job).await {
                tracing::error!("enrichment pool unavailable; keeping stub unenriched");
                enriched.push(send_error.into_inner().stub);
            }
        }
        drop(reply_tx);

        // Collect replies as workers finish; the channel closes once every
        // dispatched job has answered.
        while let Ok(listing) = reply_rx.recv_async().await {
            enriched.push(listing);
        }
        enriched
    }
}

/// The bounded detail-worker pool.
pub struct EnrichPool {
    job_tx: flume::Sender<EnrichJob>,
    workers: Vec<JoinHandle<()>>,
}

impl EnrichPool {
    /// Spawns `workers` enrichment tasks sharing one bounded job channel.
    pub fn spawn(workers: usize, policy: FetchPolicy, jitter: DelayRange) -> Self {
        let (job_tx, job_rx) = flume::bounded::<EnrichJob>(workers * 2);

        let handles = (0..workers)
            .map(|id| {
                let job_rx = job_rx.clone();
                let policy = policy.clone();
                tokio::spawn(worker_loop(id, job_rx, policy, jitter))
            })
            .collect();

        Self {
            job_tx,
            workers: handles,
        }
    }

    pub fn handle(&self) -> EnrichHandle {
        EnrichHandle {
            job_tx: self.job_tx.clone(),
        }
    }

    /// Closes the job channel and waits for the workers to drain out.
    pub async fn shutdown(self) {
        drop(self.job_tx);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!("enrichment worker failed: {e}");
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    job_rx: flume::Receiver<EnrichJob>,
    policy: FetchPolicy,
    jitter: DelayRange,
) {
    let mut fetcher = Fetcher::new(policy);
    tracing::debug!(worker = id, "detail worker up");

    while let Ok(job) = job_rx.recv_async().await {
        tokio::time::sleep(jitter.sample()).await;
        let listing = enrich_one(job.stub, &job.extractor, &mut fetcher).await;
        // Receiver may have gone away with the lane; nothing left to do then.
        let _ = job.reply.send(listing);
    }

    tracing::debug!(worker = id, "detail worker down");
}

/// Fetches and merges one stub's detail page. Degrades, never drops.
async fn enrich_one(
    mut stub: Listing,
    extractor: &Arc<dyn SourceExtractor>,
    fetcher: &mut Fetcher,
) -> Listing {
    match fetcher.fetch(&stub.link).await {
        Ok(body) => {
            stub.merge_details(extractor.parse_detail(&body));
        }
        Err(e) => {
            tracing::warn!(url = %stub.link, "detail fetch failed, keeping stub: {e}");
        }
    }
    stub
}
