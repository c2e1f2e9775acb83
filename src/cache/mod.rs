//! Caching subsystem.
//!
//! Three independent tiers, each an [`LruCache`] with its own lock:
//!
//! - **pages**: raw store page bodies (or the failure that fetching them
//!   produced), keyed on the full URL. See [`PageFetcher`](crate::fetch::PageFetcher).
//!
//! - **documents**: the parsed embedded-data blob, keyed on the app id so
//!   that URL variants of one app share a single parse. See
//!   [`DocumentExtractor`](crate::extract::DocumentExtractor).
//!
//! - **badges**: the final rendered badge, keyed on the request signature
//!   (path plus raw query). See [`BadgeService`](crate::service::BadgeService).
//!
//! A hit at any tier short-circuits every tier below it. All tiers live in
//! one [`Caches`] value built at startup and shared through an `Arc`, so each
//! test can build an isolated set.

pub mod lru;

pub use lru::LruCache;

use std::sync::Arc;

use serde_json::Value;

use crate::badge::Badge;
use crate::fetch::FetchOutcome;
use crate::telemetry;

/// Configuration for the cache tiers.
///
/// ```rust
/// # use playbadge::CacheConfig;
/// let config = CacheConfig::new().pages(100).badges(1_000);
/// assert_eq!(config.documents, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum cached store pages. Default: 500.
    pub pages: usize,
    /// Maximum cached parsed documents. Default: 500.
    pub documents: usize,
    /// Maximum cached badges. Default: 10,000.
    pub badges: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            pages: 500,
            documents: 500,
            badges: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page tier capacity (0 = unbounded).
    pub fn pages(mut self, n: usize) -> Self {
        self.pages = n;
        self
    }

    /// Set the document tier capacity (0 = unbounded).
    pub fn documents(mut self, n: usize) -> Self {
        self.documents = n;
        self
    }

    /// Set the badge tier capacity (0 = unbounded).
    pub fn badges(mut self, n: usize) -> Self {
        self.badges = n;
        self
    }
}

/// The three cache tiers of the badge pipeline.
#[derive(Debug)]
pub struct Caches {
    pub pages: LruCache<String, FetchOutcome>,
    pub documents: LruCache<String, Arc<Value>>,
    pub badges: LruCache<String, Arc<Badge>>,
}

impl Caches {
    /// Build empty tiers sized by `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            pages: LruCache::new(config.pages),
            documents: LruCache::new(config.documents),
            badges: LruCache::new(config.badges),
        }
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Record a lookup against `tier` and pass the result through.
pub(crate) fn observe<T>(tier: &'static str, key: &str, hit: Option<T>) -> Option<T> {
    if hit.is_some() {
        tracing::debug!(tier, key, "cache hit");
        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "tier" => tier).increment(1);
    } else {
        tracing::debug!(tier, key, "cache miss");
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "tier" => tier).increment(1);
    }
    hit
}
