//! Resilient HTTP fetcher
//!
//! Every worker owns exactly one `Fetcher`. The underlying client is built
//! lazily on first use and reused for all subsequent fetches issued by that
//! worker, so connection pools survive across a lane's pages without ever
//! being shared between workers.

use crate::config::FetchConfig;
use crate::NetworkError;
use rand::Rng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Fixed pool of desktop user agents; each attempt draws one at random.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36 Edg/118.0.2088.76",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:108.0) Gecko/20100101 Firefox/108.0",
];

/// Retry/backoff/timeout budget for one fetch call.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub timeout: Duration,
}

impl From<&FetchConfig> for FetchPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_secs(config.backoff_base_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// A per-worker HTTP session with retry and backoff.
pub struct Fetcher {
    policy: FetchPolicy,
    client: Option<Client>,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            client: None,
        }
    }

    /// Fetches a URL, retrying with linear backoff.
    ///
    /// A response counts as success only when it carries an HTML document
    /// marker; everything else is a soft failure retried within the same
    /// budget. Exhausting
    /// the budget yields `NetworkError::RetriesExhausted`, which callers must
    /// treat as "no data", never as fatal.
    pub async fn fetch(&mut self, url: &str) -> Result<String, NetworkError> {
        let client = self.client()?;

        for attempt in 1..=self.policy.max_attempts {
            let user_agent = USER_AGENTS[rand::thread_rng().gen_range(0..USER_AGENTS.len())];
            let result = client
                .get(url)
                .header(USER_AGENT, user_agent)
                .header(ACCEPT, "text/html,application/xhtml+xml,application/xml")
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .header(CONNECTION, "keep-alive")
                .send()
                .await;

            match result {
                Ok(response) => match response.error_for_status() {
                    Ok(response) => match response.text().await {
                        Ok(body) if looks_like_html(&body) => {
                            tracing::debug!(%url, attempt, "fetched");
                            return Ok(body);
                        }
                        Ok(_) => {
                            tracing::warn!(%url, attempt, "non-HTML response");
                        }
                        Err(e) => {
                            tracing::warn!(%url, attempt, "failed to read body: {e}");
                        }
                    },
                    Err(e) => {
                        tracing::warn!(%url, attempt, "request failed: {e}");
                    }
                },
                Err(e) => {
                    tracing::warn!(%url, attempt, "request failed: {e}");
                }
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.backoff_base * attempt;
                tracing::info!(%url, "retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            %url,
            attempts = self.policy.max_attempts,
            "all fetch attempts failed"
        );
        Err(NetworkError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
        })
    }

    /// The worker's client, built on first use.
    fn client(&mut self) -> Result<Client, NetworkError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_http_client(&self.policy)?;
        self.client = Some(client.clone());
        Ok(client)
    }
}

/// Builds a connection-pooled HTTP client for one worker.
pub fn build_http_client(policy: &FetchPolicy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(policy.timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

fn looks_like_html(body: &str) -> bool {
    // Cheap prefix scan; the marker sits in the first bytes of any real page.
    body.get(..2048)
        .unwrap_or(body)
        .to_ascii_lowercase()
        .contains("<html")
}
