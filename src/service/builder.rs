//! Builder for configuring badge services

use std::sync::Arc;
use std::time::Duration;

use super::BadgeService;
use crate::Result;
use crate::cache::{CacheConfig, Caches};
use crate::extract::{DEFAULT_STORE_URL, DocumentExtractor};
use crate::fetch::{HttpTransport, PageFetcher, ReqwestTransport};
use crate::fields::PlaceholderRegistry;

/// Default upstream request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Builder for configuring badge services.
pub struct BadgeServiceBuilder {
    cache_config: CacheConfig,
    caches: Option<Arc<Caches>>,
    store_url: String,
    timeout_secs: u64,
    transport: Option<Arc<dyn HttpTransport>>,
    placeholders: Option<PlaceholderRegistry>,
}

impl BadgeServiceBuilder {
    pub fn new() -> Self {
        Self {
            cache_config: CacheConfig::default(),
            caches: None,
            store_url: DEFAULT_STORE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            transport: None,
            placeholders: None,
        }
    }

    /// Size the cache tiers.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Share existing cache tiers instead of building new ones.
    ///
    /// Takes precedence over [`cache_config`](Self::cache_config).
    pub fn caches(mut self, caches: Arc<Caches>) -> Self {
        self.caches = Some(caches);
        self
    }

    /// URL prefix of store pages; the app id is appended query-encoded.
    pub fn store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = url.into();
        self
    }

    /// Upstream request timeout in seconds. Ignored when a transport is set.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Use a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the Play Store placeholder set.
    pub fn placeholders(mut self, registry: PlaceholderRegistry) -> Self {
        self.placeholders = Some(registry);
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<BadgeService> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(Duration::from_secs(
                self.timeout_secs,
            ))?),
        };
        let caches = self
            .caches
            .unwrap_or_else(|| Arc::new(Caches::new(&self.cache_config)));

        let fetcher = PageFetcher::new(Arc::clone(&caches), transport);
        let documents = DocumentExtractor::new(Arc::clone(&caches), fetcher, self.store_url);
        let placeholders = self.placeholders.unwrap_or_default();

        Ok(BadgeService::new(caches, documents, placeholders))
    }
}

impl Default for BadgeServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
