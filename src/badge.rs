//! Badge payloads and request validation.
//!
//! [`Badge`] is the JSON object shields.io's endpoint badge expects. It is
//! returned for successes and failures alike; a failure only differs in
//! carrying `isError: true` and no `cacheSeconds`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{BadgeError, Result};

/// Schema version of the endpoint badge format.
pub const SCHEMA_VERSION: u8 = 1;

/// Caching hint sent with successfully rendered badges.
pub const BADGE_CACHE_SECONDS: u32 = 3600;

/// Caching hint sent with the stats badge.
pub const STATS_CACHE_SECONDS: u32 = 60;

/// Label template used when the request has none.
pub const DEFAULT_LABEL: &str = "play";

/// Message template used when the request has none.
pub const DEFAULT_MESSAGE: &str = "$version";

/// Dot-separated word segments, at least two of them.
static APP_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]+(\.[a-zA-Z0-9_]+)+$").expect("app id pattern is valid")
});

/// Endpoint badge payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Badge {
    /// A successfully rendered badge.
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            label: label.into(),
            message: message.into(),
            cache_seconds: Some(BADGE_CACHE_SECONDS),
            is_error: false,
        }
    }

    /// An error badge showing `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            label: "error".to_string(),
            message: message.into(),
            cache_seconds: None,
            is_error: true,
        }
    }

    /// Override the caching hint.
    pub fn with_cache_seconds(mut self, seconds: u32) -> Self {
        self.cache_seconds = Some(seconds);
        self
    }
}

/// Parameters of one badge request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeRequest {
    pub app_id: Option<String>,
    pub label: Option<String>,
    pub message: Option<String>,
}

impl BadgeRequest {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Read a request from query parameters.
    ///
    /// Short names win over long ones: `i` over `id`, `l` over `label`,
    /// `m` over `message`.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let pick = |keys: [&str; 2]| keys.iter().find_map(|k| params.get(*k).cloned());
        Self {
            app_id: pick(["i", "id"]),
            label: pick(["l", "label"]),
            message: pick(["m", "message"]),
        }
    }

    /// The label template, or [`DEFAULT_LABEL`].
    pub fn label_template(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_LABEL)
    }

    /// The message template, or [`DEFAULT_MESSAGE`].
    pub fn message_template(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE)
    }
}

/// Check that an app id is present and well formed.
pub fn validate_app_id(app_id: Option<&str>) -> Result<&str> {
    match app_id {
        None | Some("") => Err(BadgeError::MissingAppId),
        Some(id) if APP_ID_PATTERN.is_match(id) => Ok(id),
        Some(id) => Err(BadgeError::InvalidAppId(id.to_string())),
    }
}
