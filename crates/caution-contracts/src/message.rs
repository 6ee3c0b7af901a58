//! Warning message descriptors.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What to record when a warning is added.
///
/// `Key` is a symbolic reason (e.g. `not_a_number`) resolved to text through
/// the translation catalog. `Text` is stored verbatim. `Lazy` is evaluated at
/// the moment the warning is added.
#[derive(Clone)]
pub enum Message {
    Key(String),
    Text(String),
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Message {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn lazy(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(f))
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::Key("invalid".to_string())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// The structured record kept next to every rendered warning.
///
/// `kind` preserves the symbolic reason (`blank`, `greater_than`, ...) so
/// callers can look warnings up independently of the rendered language.
/// Warnings added with literal text use the text itself as their kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningDetail {
    pub kind: String,
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl WarningDetail {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: BTreeMap::new(),
        }
    }
}
