//! Telemetry metric name constants.
//!
//! Centralised metric names for the badge pipeline. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `playbadge_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `tier`: cache tier: "page", "document" or "badge"
//! - `status`: outcome: "ok" or "error"

/// Total cache hits.
///
/// Labels: `tier`.
pub const CACHE_HITS_TOTAL: &str = "playbadge_cache_hits_total";

/// Total cache misses.
///
/// Labels: `tier`.
pub const CACHE_MISSES_TOTAL: &str = "playbadge_cache_misses_total";

/// Total network fetches of store pages.
///
/// Labels: `status` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "playbadge_fetches_total";

/// Store page fetch duration in seconds.
pub const FETCH_DURATION_SECONDS: &str = "playbadge_fetch_duration_seconds";

/// Total renders that finished with at least one unresolved placeholder.
pub const RENDER_ERRORS_TOTAL: &str = "playbadge_render_errors_total";

/// Tier label for the store page cache.
pub const TIER_PAGE: &str = "page";

/// Tier label for the parsed document cache.
pub const TIER_DOCUMENT: &str = "document";

/// Tier label for the rendered badge cache.
pub const TIER_BADGE: &str = "badge";
