//! Embedded data extraction from store pages.
//!
//! A store page carries its facts as JavaScript literals passed to
//! `AF_initDataCallback({...})`. A page embeds several such blobs; the one
//! describing the app is recognised by containing the app id as a one-element
//! list (`["org.example.app"],`). Its `data:` field, up to `sideChannel:`,
//! is a JSON array, which is parsed into a [`serde_json::Value`] tree.
//!
//! Parsed documents are cached on the app id rather than the URL, so every
//! URL variant of one app shares a single parse. Extraction failures are
//! returned but never cached: they usually mean the page format moved, and
//! the next request should look again.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::cache::{self, Caches};
use crate::fetch::PageFetcher;
use crate::telemetry;
use crate::{BadgeError, Result};

/// Default store page URL; the app id is appended query-encoded.
pub const DEFAULT_STORE_URL: &str = "https://play.google.com/store/apps/details?hl=en_US&id=";

/// Introduces each embedded data blob.
pub const BLOB_MARKER: &str = "AF_initDataCallback({";
/// Ends the script element holding a blob.
const SCRIPT_END: &str = "</script>";
/// Key preceding the payload inside a blob.
const DATA_KEY: &str = "data:";
/// Key following the payload inside a blob.
const SIDE_CHANNEL_KEY: &str = "sideChannel:";

/// Build the store page URL for `app_id`.
pub fn store_url(base_url: &str, app_id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(app_id.as_bytes()).collect();
    format!("{base_url}{encoded}")
}

/// Locate the payload text of the blob describing `app_id`.
///
/// When several blobs mention the id, the last one wins.
pub fn extract_payload<'a>(body: &'a str, app_id: &str) -> Result<&'a str> {
    let needle = format!("[{}],", serde_json::to_string(app_id)?);

    let mut payload = None;
    for blob in body.split(BLOB_MARKER).skip(1) {
        if !blob.contains(&needle) {
            continue;
        }
        let script = blob.split(SCRIPT_END).next().unwrap_or(blob).trim();
        let Some((_, data)) = script.split_once(DATA_KEY) else {
            continue;
        };
        let data = data.split(SIDE_CHANNEL_KEY).next().unwrap_or(data).trim();
        payload = Some(data.strip_suffix(',').unwrap_or(data));
    }

    payload.ok_or_else(|| BadgeError::Parse(format!("no embedded data for {app_id}")))
}

/// Extract and parse the document describing `app_id` from a page body.
pub fn parse_document(body: &str, app_id: &str) -> Result<Value> {
    let payload = extract_payload(body, app_id)?;
    serde_json::from_str(payload)
        .map_err(|e| BadgeError::Parse(format!("invalid embedded data for {app_id}: {e}")))
}

/// Embedded-data extractor backed by the document tier.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    caches: Arc<Caches>,
    fetcher: PageFetcher,
    base_url: String,
}

impl DocumentExtractor {
    /// Create an extractor fetching pages below `base_url`.
    pub fn new(caches: Arc<Caches>, fetcher: PageFetcher, base_url: impl Into<String>) -> Self {
        Self {
            caches,
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// The URL prefix store pages are fetched from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Return the parsed document for `app_id`, fetching and parsing on a miss.
    pub async fn fetch_parsed(&self, app_id: &str) -> Result<Arc<Value>> {
        if let Some(document) = cache::observe(
            telemetry::TIER_DOCUMENT,
            app_id,
            self.caches.documents.get(app_id),
        ) {
            return Ok(document);
        }

        let url = store_url(&self.base_url, app_id);
        let body = self.fetcher.fetch_body(&url).await?;
        let document = match parse_document(&body, app_id) {
            Ok(document) => Arc::new(document),
            Err(e) => {
                warn!(app_id, error = %e, "failed to extract embedded data");
                return Err(e);
            }
        };

        self.caches
            .documents
            .set(app_id.to_string(), Arc::clone(&document));
        Ok(document)
    }
}
