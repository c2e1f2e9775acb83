//! Placeholder registry and field resolvers.
//!
//! Every placeholder (`$version`, `$rating`, ...) names one fact inside the
//! parsed store document. Facts are reached through a fixed chain of list
//! indices, so each resolver is declared as data: a [`FieldPath`] saying
//! where the leaf lives, how to turn it into text, and whether an empty leaf
//! should render as [`VARIES`]. The shared [`lookup`] helper does the walk
//! and reports the failing step instead of panicking.
//!
//! Resolvers obtain their document through a [`DocumentSource`], which in
//! production is the cached [`DocumentExtractor`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FieldError;
use crate::extract::DocumentExtractor;
use crate::{BadgeError, Result};

/// Rendered in place of a field the store leaves empty.
pub const VARIES: &str = "Varies with device";

/// Source of parsed documents keyed by app id.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn document(&self, app_id: &str) -> Result<Arc<Value>>;
}

#[async_trait]
impl DocumentSource for DocumentExtractor {
    async fn document(&self, app_id: &str) -> Result<Arc<Value>> {
        self.fetch_parsed(app_id).await
    }
}

/// How a leaf value becomes text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    /// A string, used as is.
    Text,
    /// An integer, printed in decimal.
    Integer,
    /// A float, printed in shortest form (`4.5`, `4`).
    Float,
    /// An integer with thousands separators (`1,234,567`).
    GroupedInteger,
}

/// Location and coercion of one field inside the store document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub indices: &'static [usize],
    pub leaf: Leaf,
    /// Render null, blank text or an integer below 1 as [`VARIES`].
    pub varies_when_empty: bool,
}

impl FieldPath {
    pub const fn new(indices: &'static [usize], leaf: Leaf) -> Self {
        Self {
            indices,
            leaf,
            varies_when_empty: false,
        }
    }

    pub const fn or_varies(mut self) -> Self {
        self.varies_when_empty = true;
        self
    }

    /// Walk the path and coerce the leaf to text.
    pub fn extract(&self, document: &Value) -> std::result::Result<String, FieldError> {
        let leaf = lookup(document, self.indices)?;
        if self.varies_when_empty && leaf.is_null() {
            return Ok(VARIES.to_string());
        }
        match self.leaf {
            Leaf::Text => {
                let text = leaf.as_str().ok_or(FieldError::WrongType {
                    expected: "string",
                    found: kind(leaf),
                })?;
                if self.varies_when_empty && text.trim().is_empty() {
                    Ok(VARIES.to_string())
                } else {
                    Ok(text.to_string())
                }
            }
            Leaf::Integer => {
                let n = as_integer(leaf)?;
                if self.varies_when_empty && n < 1 {
                    Ok(VARIES.to_string())
                } else {
                    Ok(n.to_string())
                }
            }
            Leaf::Float => {
                let f = leaf.as_f64().ok_or(FieldError::WrongType {
                    expected: "number",
                    found: kind(leaf),
                })?;
                Ok(f.to_string())
            }
            Leaf::GroupedInteger => Ok(group_thousands(as_integer(leaf)?)),
        }
    }
}

/// How a placeholder produces its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Read a field from the store document.
    Path(FieldPath),
    /// Kept so old badge URLs keep rendering; always empty, never fetches.
    Defunct,
}

/// A recognised template token together with its resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub token: &'static str,
    pub description: &'static str,
    pub extractor: Extractor,
}

impl Placeholder {
    pub const fn field(token: &'static str, description: &'static str, path: FieldPath) -> Self {
        Self {
            token,
            description,
            extractor: Extractor::Path(path),
        }
    }

    pub const fn defunct(token: &'static str, description: &'static str) -> Self {
        Self {
            token,
            description,
            extractor: Extractor::Defunct,
        }
    }

    /// Resolve this placeholder for `app_id`.
    ///
    /// Document failures pass through unchanged; lookup failures are tagged
    /// with the token.
    pub async fn resolve(&self, source: &dyn DocumentSource, app_id: &str) -> Result<String> {
        let path = match self.extractor {
            Extractor::Defunct => return Ok(String::new()),
            Extractor::Path(path) => path,
        };
        let document = source.document(app_id).await?;
        path.extract(&document).map_err(|e| BadgeError::Field {
            placeholder: self.token.to_string(),
            source: e,
        })
    }
}

/// Immutable set of placeholders, built once at startup.
///
/// Every token starts with `$`; templates are scanned for tokens at each `$`.
#[derive(Debug, Clone)]
pub struct PlaceholderRegistry {
    placeholders: Vec<Placeholder>,
}

impl PlaceholderRegistry {
    /// Build a registry. Longer tokens come first so that a token which is a
    /// prefix of another never claims part of the longer one.
    pub fn new(mut placeholders: Vec<Placeholder>) -> Self {
        placeholders.sort_by(|a, b| {
            b.token
                .len()
                .cmp(&a.token.len())
                .then_with(|| a.token.cmp(b.token))
        });
        placeholders.dedup_by(|a, b| a.token == b.token);
        Self { placeholders }
    }

    /// The Play Store placeholder set.
    pub fn play_store() -> Self {
        Self::new(PLAY_STORE.to_vec())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter()
    }

    pub fn get(&self, token: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.token == token)
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Token → description, for the landing page.
    pub fn descriptions(&self) -> BTreeMap<&'static str, &'static str> {
        self.placeholders
            .iter()
            .map(|p| (p.token, p.description))
            .collect()
    }
}

impl Default for PlaceholderRegistry {
    fn default() -> Self {
        Self::play_store()
    }
}

const PLAY_STORE: &[Placeholder] = &[
    Placeholder::field(
        "$version",
        "App version",
        FieldPath::new(&[1, 2, 140, 0, 0, 0], Leaf::Text).or_varies(),
    ),
    Placeholder::field(
        "$installs",
        "Installs",
        FieldPath::new(&[1, 2, 13, 3], Leaf::Text),
    ),
    Placeholder::field(
        "$totalinstalls",
        "Precise installs",
        FieldPath::new(&[1, 2, 13, 2], Leaf::GroupedInteger),
    ),
    Placeholder::field(
        "$shortinstalls",
        "Shorter installs",
        FieldPath::new(&[1, 2, 13, 3], Leaf::Text),
    ),
    Placeholder::defunct("$size", "*Defunct, returns empty string"),
    Placeholder::field(
        "$updated",
        "Last update",
        FieldPath::new(&[1, 2, 145, 0, 0], Leaf::Text),
    ),
    Placeholder::field(
        "$android",
        "Required min. Android version",
        FieldPath::new(&[1, 2, 140, 1, 1, 0, 0, 1], Leaf::Text).or_varies(),
    ),
    Placeholder::field(
        "$minsdk",
        "Required min. SDK",
        FieldPath::new(&[1, 2, 140, 1, 1, 0, 0, 0], Leaf::Integer).or_varies(),
    ),
    Placeholder::field(
        "$targetsdk",
        "Target SDK",
        FieldPath::new(&[1, 2, 140, 1, 0, 0, 0], Leaf::Integer),
    ),
    Placeholder::field(
        "$targetandroid",
        "Target Android version",
        FieldPath::new(&[1, 2, 140, 1, 0, 0, 1], Leaf::Text),
    ),
    Placeholder::field(
        "$rating",
        "Rating",
        FieldPath::new(&[1, 2, 51, 0, 0], Leaf::Text),
    ),
    Placeholder::field(
        "$floatrating",
        "Precise rating",
        FieldPath::new(&[1, 2, 51, 0, 1], Leaf::Float),
    ),
    Placeholder::field("$name", "Name", FieldPath::new(&[1, 2, 0, 0], Leaf::Text)),
    Placeholder::field(
        "$friendly",
        "Content Rating",
        FieldPath::new(&[1, 2, 9, 0], Leaf::Text),
    ),
    Placeholder::field(
        "$published",
        "First published",
        FieldPath::new(&[1, 2, 10, 0], Leaf::Text),
    ),
];

/// Follow `path` through nested lists.
pub fn lookup<'a>(document: &'a Value, path: &[usize]) -> std::result::Result<&'a Value, FieldError> {
    path.iter()
        .enumerate()
        .try_fold(document, |node, (step, &index)| match node {
            Value::Array(items) => items.get(index).ok_or(FieldError::OutOfRange {
                step,
                index,
                len: items.len(),
            }),
            other => Err(FieldError::NotIndexable {
                step,
                found: kind(other),
            }),
        })
}

fn as_integer(value: &Value) -> std::result::Result<i64, FieldError> {
    value.as_i64().ok_or(FieldError::WrongType {
        expected: "integer",
        found: kind(value),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
