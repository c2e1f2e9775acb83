//! Placeholder substitution.
//!
//! [`render`] rewrites a badge template by replacing every registered token
//! with its resolved value. The template is split into literal text and
//! token segments in one left-to-right pass, matching the longest token at
//! each `$`. Each distinct token is then resolved once and all of its
//! occurrences receive the same text. Resolved values are written to the
//! output as is and never scanned for further tokens, so text coming from
//! the store can not trigger another substitution.
//!
//! A token that fails to resolve is left in place and its error is
//! collected; the remaining tokens are still substituted, and the caller
//! gets the partial text together with every error in a single
//! [`RenderError`].
//!
//! A doubled `$$` is a literal and is never treated as a token introducer.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::BadgeError;
use crate::fields::{DocumentSource, Placeholder, PlaceholderRegistry};
use crate::telemetry;

/// Upper bound, in characters, for templates and resolved values.
pub const MAX_TEXT_CHARS: usize = 1000;

/// Introduces a token.
const TOKEN_START: char = '$';
/// Literal dollar pair in templates.
const ESCAPE: &str = "$$";

/// One or more placeholders failed to resolve.
#[derive(Debug)]
pub struct RenderError {
    /// The template with every resolvable token substituted.
    pub partial: String,
    /// One entry per failed token.
    pub errors: Vec<BadgeError>,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderError {}

/// Cut `text` to at most `max` characters, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Token(&'a Placeholder),
}

/// Split `template` into literals and tokens.
///
/// The registry lists longer tokens first, so the first match at a `$` is
/// the longest one.
fn segments<'a>(template: &'a str, registry: &'a PlaceholderRegistry) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(offset) = template[pos..].find(TOKEN_START) {
        let at = pos + offset;
        let tail = &template[at..];
        if tail.starts_with(ESCAPE) {
            pos = at + ESCAPE.len();
            continue;
        }
        match registry.iter().find(|p| tail.starts_with(p.token)) {
            Some(placeholder) => {
                if literal_start < at {
                    segments.push(Segment::Literal(&template[literal_start..at]));
                }
                segments.push(Segment::Token(placeholder));
                pos = at + placeholder.token.len();
                literal_start = pos;
            }
            None => pos = at + TOKEN_START.len_utf8(),
        }
    }
    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Substitute every registered token in `template` for `app_id`.
pub async fn render(
    template: &str,
    registry: &PlaceholderRegistry,
    source: &dyn DocumentSource,
    app_id: &str,
) -> Result<String, RenderError> {
    let segments = segments(template, registry);

    let mut values: HashMap<&str, String> = HashMap::new();
    let mut errors = Vec::new();
    for placeholder in registry.iter() {
        let present = segments
            .iter()
            .any(|s| matches!(s, Segment::Token(p) if p.token == placeholder.token));
        if !present {
            continue;
        }
        match placeholder.resolve(source, app_id).await {
            Ok(value) => {
                let value = truncate_chars(&value, MAX_TEXT_CHARS).to_string();
                values.insert(placeholder.token, value);
            }
            Err(e) => {
                debug!(token = placeholder.token, app_id, error = %e, "placeholder unresolved");
                errors.push(e);
            }
        }
    }

    let mut text = String::with_capacity(template.len());
    for segment in &segments {
        match segment {
            Segment::Literal(literal) => text.push_str(literal),
            Segment::Token(p) => text.push_str(values.get(p.token).map_or(p.token, String::as_str)),
        }
    }

    if errors.is_empty() {
        Ok(text)
    } else {
        metrics::counter!(telemetry::RENDER_ERRORS_TOTAL).increment(1);
        Err(RenderError {
            partial: text,
            errors,
        })
    }
}
