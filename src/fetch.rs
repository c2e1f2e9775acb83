//! Store page fetching with positive and negative caching.
//!
//! [`PageFetcher`] sits at the bottom of the pipeline. It asks the page tier
//! first; on a miss it performs exactly one GET through an [`HttpTransport`],
//! strips everything up to the end of the document head, and caches the
//! outcome, whether it is a body or a failure.
//!
//! Failures are cached just like successes and are only dropped when the
//! page tier evicts them under capacity pressure. A URL that once returned
//! 404 keeps returning the cached 404 without touching the network.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::cache::{self, Caches};
use crate::telemetry;
use crate::{BadgeError, Result};

/// Everything before this marker is page boilerplate.
pub const HEAD_END: &str = "</head>";

/// Raw response from an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Status line text, e.g. `"404 Not Found"`.
    pub status_text: String,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A transport-level failure (connection refused, timeout, unreadable body).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Minimal HTTP capability the fetcher needs.
///
/// The production implementation is [`ReqwestTransport`]; tests plug in
/// fakes that count calls.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET request for `url`.
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("playbadge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BadgeError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.to_string(),
            body,
        })
    }
}

/// Cached result of fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page body with the head stripped.
    Success(Arc<str>),
    /// Error text or status line of the failed fetch.
    Failure(Arc<str>),
}

impl FetchOutcome {
    /// Convert into a result, mapping a failure to [`BadgeError::Unavailable`].
    pub fn into_result(self) -> Result<Arc<str>> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(reason) => Err(BadgeError::Unavailable(reason.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Drop everything up to and including the first [`HEAD_END`].
///
/// A page without a head end is kept whole.
pub fn strip_head(body: &str) -> &str {
    body.split_once(HEAD_END).map_or(body, |(_, rest)| rest)
}

/// Raw document fetcher backed by the page tier.
#[derive(Clone)]
pub struct PageFetcher {
    caches: Arc<Caches>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetcher")
            .field("pages", &self.caches.pages)
            .finish_non_exhaustive()
    }
}

impl PageFetcher {
    pub fn new(caches: Arc<Caches>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { caches, transport }
    }

    /// Fetch the body of `url`, consulting the page tier first.
    ///
    /// The network call runs without holding any cache lock; only the
    /// final insert takes the page tier's lock.
    pub async fn fetch_body(&self, url: &str) -> Result<Arc<str>> {
        if let Some(outcome) = cache::observe(
            telemetry::TIER_PAGE,
            url,
            self.caches.pages.get(url),
        ) {
            return outcome.into_result();
        }

        let outcome = self.download(url).await;
        self.caches.pages.set(url.to_string(), outcome.clone());
        outcome.into_result()
    }

    async fn download(&self, url: &str) -> FetchOutcome {
        let start = Instant::now();
        let result = self.transport.get(url).await;
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        let outcome = match result {
            Err(e) => {
                warn!(url, error = %e, "store page fetch failed");
                FetchOutcome::Failure(e.0.into())
            }
            Ok(response) if !response.is_success() => {
                warn!(url, status = response.status, "store page returned error status");
                FetchOutcome::Failure(response.status_text.into())
            }
            Ok(response) => {
                info!(
                    url,
                    status = response.status,
                    bytes = response.body.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "fetched store page"
                );
                FetchOutcome::Success(strip_head(&response.body).into())
            }
        };

        let status = if outcome.is_success() { "ok" } else { "error" };
        metrics::counter!(telemetry::FETCHES_TOTAL, "status" => status).increment(1);
        outcome
    }
}
