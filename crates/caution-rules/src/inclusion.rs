//! Inclusion: warn when a value is not a member of a list or numeric range.

use std::ops::{Range, RangeInclusive};

use serde_json::Value;

use caution_contracts::{value, Attribute, CautionResult, Message};
use caution_core::{CautionOptions, Cautionable, EachCheck};

/// The accepted values.
#[derive(Debug, Clone, PartialEq)]
pub enum Membership {
    /// Explicit values; numbers compare by numeric value.
    List(Vec<Value>),
    /// A numeric interval, closed at `start`.
    Range { start: f64, end: f64, exclusive: bool },
}

impl Membership {
    pub fn list<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, candidate: &Value) -> bool {
        match self {
            Self::List(values) => values.iter().any(|v| value::loosely_equal(v, candidate)),
            Self::Range {
                start,
                end,
                exclusive,
            } => match value::as_number(candidate) {
                Some(n) if *exclusive => *start <= n && n < *end,
                Some(n) => *start <= n && n <= *end,
                None => false,
            },
        }
    }
}

impl From<RangeInclusive<i64>> for Membership {
    fn from(range: RangeInclusive<i64>) -> Self {
        Self::Range {
            start: *range.start() as f64,
            end: *range.end() as f64,
            exclusive: false,
        }
    }
}

impl From<Range<i64>> for Membership {
    fn from(range: Range<i64>) -> Self {
        Self::Range {
            start: range.start as f64,
            end: range.end as f64,
            exclusive: true,
        }
    }
}

impl From<Vec<Value>> for Membership {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InclusionCheck {
    within: Membership,
}

impl InclusionCheck {
    pub fn new(within: impl Into<Membership>) -> Self {
        Self {
            within: within.into(),
        }
    }

    pub fn membership(&self) -> &Membership {
        &self.within
    }
}

impl<R: Cautionable> EachCheck<R> for InclusionCheck {
    fn kind(&self) -> &str {
        "inclusion"
    }

    fn caution_each(
        &self,
        record: &mut R,
        attribute: &Attribute,
        value: &Value,
        options: &CautionOptions<R>,
    ) -> CautionResult<()> {
        if !self.within.contains(value) {
            record.warnings_mut().add_with(
                attribute,
                Message::key("inclusion"),
                options.add_options(value.clone()),
            )?;
        }
        Ok(())
    }
}
