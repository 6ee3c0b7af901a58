//! Format: warn when a value's text fails a required pattern or matches a
//! forbidden one.

use std::{fmt, sync::Arc};

use regex::Regex;
use serde_json::Value;

use caution_contracts::{value, Attribute, CautionError, CautionResult, Message};
use caution_core::{CautionOptions, Cautionable, EachCheck};

/// A pattern fixed at declaration time or computed from the record.
pub enum Pattern<R> {
    Literal(Regex),
    Computed(Arc<dyn Fn(&R) -> Regex + Send + Sync>),
}

impl<R> Pattern<R> {
    pub fn computed(f: impl Fn(&R) -> Regex + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    fn is_match(&self, record: &R, text: &str) -> bool {
        match self {
            Self::Literal(regex) => regex.is_match(text),
            Self::Computed(f) => f(record).is_match(text),
        }
    }
}

impl<R> From<Regex> for Pattern<R> {
    fn from(regex: Regex) -> Self {
        Self::Literal(regex)
    }
}

impl<R> fmt::Debug for Pattern<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(regex) => f.debug_tuple("Literal").field(&regex.as_str()).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Exactly one of `with` / `without` must be set; registration fails
/// otherwise.
pub struct FormatCheck<R> {
    with: Option<Pattern<R>>,
    without: Option<Pattern<R>>,
}

impl<R> fmt::Debug for FormatCheck<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCheck")
            .field("with", &self.with)
            .field("without", &self.without)
            .finish()
    }
}

impl<R> Default for FormatCheck<R> {
    fn default() -> Self {
        Self {
            with: None,
            without: None,
        }
    }
}

impl<R> FormatCheck<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn unless the value matches `pattern`.
    pub fn matching(pattern: impl Into<Pattern<R>>) -> Self {
        Self::new().with(pattern)
    }

    /// Warn when the value matches `pattern`.
    pub fn not_matching(pattern: impl Into<Pattern<R>>) -> Self {
        Self::new().without(pattern)
    }

    pub fn with(mut self, pattern: impl Into<Pattern<R>>) -> Self {
        self.with = Some(pattern.into());
        self
    }

    pub fn without(mut self, pattern: impl Into<Pattern<R>>) -> Self {
        self.without = Some(pattern.into());
        self
    }
}

impl<R: Cautionable> EachCheck<R> for FormatCheck<R> {
    fn kind(&self) -> &str {
        "format"
    }

    fn check_validity(&self) -> CautionResult<()> {
        if self.with.is_some() == self.without.is_some() {
            return Err(CautionError::config(
                "format caution needs either `with` or `without`, but not both",
            ));
        }
        Ok(())
    }

    fn caution_each(
        &self,
        record: &mut R,
        attribute: &Attribute,
        value: &Value,
        options: &CautionOptions<R>,
    ) -> CautionResult<()> {
        let text = value::to_text(value);
        let flagged = match (&self.with, &self.without) {
            (Some(with), _) => !with.is_match(record, &text),
            (None, Some(without)) => without.is_match(record, &text),
            (None, None) => false,
        };
        if flagged {
            record.warnings_mut().add_with(
                attribute,
                Message::key("invalid"),
                options.add_options(value.clone()),
            )?;
        }
        Ok(())
    }
}
