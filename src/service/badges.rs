//! BadgeService - the rendered-badge tier on top of the document pipeline

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::BadgeServiceBuilder;
use crate::Result;
use crate::badge::{Badge, BadgeRequest, STATS_CACHE_SECONDS, validate_app_id};
use crate::cache::{self, Caches};
use crate::extract::DocumentExtractor;
use crate::fields::PlaceholderRegistry;
use crate::render::{MAX_TEXT_CHARS, render, truncate_chars};
use crate::telemetry;

/// Renders badges for store apps, caching every successful result.
#[derive(Debug)]
pub struct BadgeService {
    caches: Arc<Caches>,
    documents: DocumentExtractor,
    placeholders: PlaceholderRegistry,
}

impl BadgeService {
    /// Create a new builder for configuring the service.
    pub fn builder() -> BadgeServiceBuilder {
        BadgeServiceBuilder::new()
    }

    pub(crate) fn new(
        caches: Arc<Caches>,
        documents: DocumentExtractor,
        placeholders: PlaceholderRegistry,
    ) -> Self {
        Self {
            caches,
            documents,
            placeholders,
        }
    }

    pub fn caches(&self) -> &Arc<Caches> {
        &self.caches
    }

    pub fn documents(&self) -> &DocumentExtractor {
        &self.documents
    }

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.placeholders
    }

    /// Answer a badge request identified by `signature`.
    ///
    /// The signature is the request path plus its raw query; identical
    /// signatures are served from the badge tier without validation or any
    /// lower tier. Failures become an error badge and are not cached.
    pub async fn badge(&self, signature: &str, request: &BadgeRequest) -> Arc<Badge> {
        if let Some(badge) = cache::observe(
            telemetry::TIER_BADGE,
            signature,
            self.caches.badges.get(signature),
        ) {
            return badge;
        }

        match self.render(request).await {
            Ok(badge) => {
                let badge = Arc::new(badge);
                self.caches
                    .badges
                    .set(signature.to_string(), Arc::clone(&badge));
                badge
            }
            Err(e) => {
                debug!(signature, error = %e, "badge request failed");
                Arc::new(Badge::error(e.to_string()))
            }
        }
    }

    /// Validate `request` and render its message and label.
    ///
    /// Bypasses the badge tier; lower tiers are still consulted.
    pub async fn render(&self, request: &BadgeRequest) -> Result<Badge> {
        let app_id = validate_app_id(request.app_id.as_deref())?;
        let label = truncate_chars(request.label_template(), MAX_TEXT_CHARS);
        let message = truncate_chars(request.message_template(), MAX_TEXT_CHARS);

        let message = render(message, &self.placeholders, &self.documents, app_id).await?;
        let label = render(label, &self.placeholders, &self.documents, app_id).await?;

        info!(app_id, %label, %message, "rendered badge");
        Ok(Badge::new(label, message))
    }

    /// Summary badge of the page and badge tiers.
    pub fn stats(&self) -> Badge {
        let message = format!(
            "{} apps with {} badges",
            self.caches.pages.len(),
            self.caches.badges.len()
        );
        Badge::new("Status", message).with_cache_seconds(STATS_CACHE_SECONDS)
    }

    /// Token to description map of every supported placeholder.
    pub fn descriptions(&self) -> BTreeMap<&'static str, &'static str> {
        self.placeholders.descriptions()
    }
}
