//! Playbadge - shields.io endpoint badges for Play Store apps
//!
//! This crate renders badge templates such as `"v$version ($installs)"` into
//! endpoint badge JSON by scraping the app's store page. Every stage of the
//! pipeline is backed by its own bounded LRU tier: raw pages (including
//! failed fetches), parsed documents and finished badges.
//!
//! # Example
//!
//! ```rust,no_run
//! use playbadge::{BadgeRequest, BadgeService};
//!
//! #[tokio::main]
//! async fn main() -> playbadge::Result<()> {
//!     let service = BadgeService::builder().build()?;
//!
//!     let request = BadgeRequest::new("org.mozilla.firefox")
//!         .label("Firefox")
//!         .message("$version, $installs installs");
//!     let badge = service.render(&request).await?;
//!
//!     println!("{}", serde_json::to_string(&badge)?);
//!     Ok(())
//! }
//! ```

pub mod badge;
pub mod cache;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod telemetry;
pub mod version;

// Re-export main types at crate root
pub use badge::{Badge, BadgeRequest, validate_app_id};
pub use cache::{CacheConfig, Caches, LruCache};
pub use error::{BadgeError, FieldError, Result};
pub use extract::DocumentExtractor;
pub use fetch::{FetchOutcome, HttpResponse, HttpTransport, PageFetcher, ReqwestTransport, TransportError};
pub use fields::{DocumentSource, Placeholder, PlaceholderRegistry};
pub use render::{RenderError, render};
pub use service::{BadgeService, BadgeServiceBuilder};
pub use version::{PKG_VERSION, version_string};
