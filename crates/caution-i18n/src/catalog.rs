use std::{collections::HashMap, path::Path};

use toml::{Table, Value};
use tracing::debug;

use caution_contracts::{CautionError, CautionResult};
use caution_core::Translator;

const ENGLISH: &str = include_str!("../locales/en.toml");

/// A flat map of dotted keys to message templates for one locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageCatalog {
    locale: String,
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            messages: HashMap::new(),
        }
    }

    /// The bundled English defaults.
    ///
    /// # Panics
    ///
    /// If the bundled locale file does not parse.
    pub fn english() -> Self {
        Self::from_toml_str("en", ENGLISH).expect("bundled English locale is valid")
    }

    pub fn from_toml_str(locale: impl Into<String>, toml_str: &str) -> CautionResult<Self> {
        let table: Table = toml::from_str(toml_str).map_err(|e| {
            CautionError::config(format!("failed to parse message catalog TOML: {e}"))
        })?;

        let mut catalog = Self::new(locale);
        flatten(&mut catalog.messages, String::new(), table)?;
        debug!(locale = %catalog.locale, messages = catalog.messages.len(), "message catalog loaded");
        Ok(catalog)
    }

    /// Load a catalog whose locale is the file stem (`locales/fr.toml` is `fr`).
    pub fn from_file(path: &Path) -> CautionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CautionError::config(format!(
                "failed to read message catalog '{}': {}",
                path.display(),
                e
            ))
        })?;
        let locale = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        Self::from_toml_str(locale, &content)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) -> &mut Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Layer `other` over this catalog; its templates win on conflict.
    pub fn merge(mut self, other: MessageCatalog) -> Self {
        self.messages.extend(other.messages);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Translator for MessageCatalog {
    fn lookup(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}

fn flatten(into: &mut HashMap<String, String>, prefix: String, table: Table) -> CautionResult<()> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::String(template) => {
                into.insert(key, template);
            }
            Value::Table(nested) => flatten(into, key, nested)?,
            other => {
                return Err(CautionError::config(format!(
                    "message '{key}' must be a string, got {}",
                    other.type_str()
                )))
            }
        }
    }
    Ok(())
}
