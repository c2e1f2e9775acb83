//! Playbadge error types

use crate::render::RenderError;

/// Playbadge error types
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
    // Remote/network errors
    /// Transport error or non-success status fetching the store page.
    /// Cached as a negative result by the page tier.
    #[error("app unavailable: {0}")]
    Unavailable(String),

    /// The embedded data blob could not be located or parsed. Never cached.
    #[error("app unavailable: unrecognised store page ({0})")]
    Parse(String),

    // Resolution errors
    #[error("{placeholder}: {source}")]
    Field {
        placeholder: String,
        #[source]
        source: FieldError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    // Input validation errors
    #[error("missing app id")]
    MissingAppId,

    #[error("invalid app id format")]
    InvalidAppId(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BadgeError {
    /// Whether this error was raised before any cache or network access.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingAppId | Self::InvalidAppId(_))
    }
}

/// A failed step while walking an index path into a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("index {index} out of range at step {step} (length {len})")]
    OutOfRange {
        step: usize,
        index: usize,
        len: usize,
    },

    #[error("value at step {step} is {found}, not a list")]
    NotIndexable { step: usize, found: &'static str },

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type alias for Playbadge operations
pub type Result<T> = std::result::Result<T, BadgeError>;
