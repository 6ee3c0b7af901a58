//! Numericality: warn on non-numeric input, on non-integers where integers
//! are required, and on failed comparisons.
//!
//! The raw input before type casting is checked when the record keeps it and
//! it differs from the typed value, so `"12abc"` cast to `12` still warns.
//! Comparisons run in the order they were declared and each failure adds its
//! own warning, with the threshold available as `%{count}`.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, LazyLock},
};

use regex::Regex;
use serde_json::{Number, Value};

use caution_contracts::{value, Attribute, CautionError, CautionResult, Message};
use caution_core::{CautionOptions, Cautionable, Condition, EachCheck};

static HEX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A0[xX]").expect("hex prefix pattern is valid"));

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A[+-]?\d+(?:_\d+)*(?:\.\d+(?:_\d+)*)?(?:[eE][+-]?\d+)?\z")
        .expect("decimal pattern is valid")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[+-]?\d+\z").expect("integer pattern is valid"));

/// Parse a raw value as a number: JSON numbers as they are, strings when
/// they spell a decimal (surrounding whitespace and digit underscores
/// allowed, hex rejected). Everything else is not a number.
pub fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            if HEX_PREFIX.is_match(s) {
                return None;
            }
            let trimmed = s.trim();
            if !DECIMAL.is_match(trimmed) {
                return None;
            }
            trimmed.replace('_', "").parse().ok()
        }
        _ => None,
    }
}

/// True when the value's text is an optionally signed run of digits.
pub fn is_integer(raw: &Value) -> bool {
    INTEGER.is_match(&value::to_text(raw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    GreaterThanOrEqualTo,
    EqualTo,
    LessThan,
    LessThanOrEqualTo,
    OtherThan,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::GreaterThan,
        Comparison::GreaterThanOrEqualTo,
        Comparison::EqualTo,
        Comparison::LessThan,
        Comparison::LessThanOrEqualTo,
        Comparison::OtherThan,
    ];

    /// The option name, which is also the message key.
    pub fn key(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Self::EqualTo => "equal_to",
            Self::LessThan => "less_than",
            Self::LessThanOrEqualTo => "less_than_or_equal_to",
            Self::OtherThan => "other_than",
        }
    }

    pub fn holds(self, n: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => n > threshold,
            Self::GreaterThanOrEqualTo => n >= threshold,
            Self::EqualTo => n == threshold,
            Self::LessThan => n < threshold,
            Self::LessThanOrEqualTo => n <= threshold,
            Self::OtherThan => n != threshold,
        }
    }
}

impl FromStr for Comparison {
    type Err = CautionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| CautionError::config(format!("unknown numericality check '{s}'")))
    }
}

/// What a comparison compares against.
pub enum Threshold<R> {
    Literal(f64),
    /// Another attribute of the same record.
    Attribute(Attribute),
    Computed(Arc<dyn Fn(&R) -> f64 + Send + Sync>),
}

impl<R> Threshold<R> {
    pub fn attribute(name: impl Into<Attribute>) -> Self {
        Self::Attribute(name.into())
    }

    pub fn computed(f: impl Fn(&R) -> f64 + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }
}

impl<R: Cautionable> Threshold<R> {
    fn resolve(&self, record: &R) -> CautionResult<f64> {
        match self {
            Self::Literal(n) => Ok(*n),
            Self::Computed(f) => Ok(f(record)),
            Self::Attribute(attribute) => value::as_number(&record.read_attribute(attribute))
                .ok_or_else(|| CautionError::Callback {
                    name: attribute.to_string(),
                    reason: "numericality threshold is not a number".to_string(),
                }),
        }
    }
}

impl<R> From<f64> for Threshold<R> {
    fn from(n: f64) -> Self {
        Self::Literal(n)
    }
}

impl<R> From<i64> for Threshold<R> {
    fn from(n: i64) -> Self {
        Self::Literal(n as f64)
    }
}

impl<R> From<i32> for Threshold<R> {
    fn from(n: i32) -> Self {
        Self::Literal(f64::from(n))
    }
}

impl<R> fmt::Debug for Threshold<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => f.debug_tuple("Literal").field(n).finish(),
            Self::Attribute(a) => f.debug_tuple("Attribute").field(a).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

enum NumericCheck<R> {
    Compare(Comparison, Threshold<R>),
    Odd,
    Even,
}

impl<R> fmt::Debug for NumericCheck<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(c, t) => f.debug_tuple(c.key()).field(t).finish(),
            Self::Odd => f.write_str("odd"),
            Self::Even => f.write_str("even"),
        }
    }
}

pub struct NumericalityCheck<R> {
    only_integer: Condition<R>,
    checks: Vec<NumericCheck<R>>,
}

impl<R> Default for NumericalityCheck<R> {
    fn default() -> Self {
        Self {
            only_integer: Condition::Literal(false),
            checks: Vec::new(),
        }
    }
}

impl<R> fmt::Debug for NumericalityCheck<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericalityCheck")
            .field("only_integer", &self.only_integer)
            .field("checks", &self.checks)
            .finish()
    }
}

impl<R> NumericalityCheck<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_integer(mut self) -> Self {
        self.only_integer = Condition::Literal(true);
        self
    }

    /// Require integers only when `condition` holds for the record.
    pub fn only_integer_if(mut self, condition: Condition<R>) -> Self {
        self.only_integer = condition;
        self
    }

    pub fn compare(mut self, comparison: Comparison, threshold: impl Into<Threshold<R>>) -> Self {
        self.checks
            .push(NumericCheck::Compare(comparison, threshold.into()));
        self
    }

    pub fn greater_than(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::GreaterThan, threshold)
    }

    pub fn greater_than_or_equal_to(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::GreaterThanOrEqualTo, threshold)
    }

    pub fn equal_to(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::EqualTo, threshold)
    }

    pub fn less_than(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::LessThan, threshold)
    }

    pub fn less_than_or_equal_to(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::LessThanOrEqualTo, threshold)
    }

    pub fn other_than(self, threshold: impl Into<Threshold<R>>) -> Self {
        self.compare(Comparison::OtherThan, threshold)
    }

    pub fn odd(mut self) -> Self {
        self.checks.push(NumericCheck::Odd);
        self
    }

    pub fn even(mut self) -> Self {
        self.checks.push(NumericCheck::Even);
        self
    }
}

impl<R: Cautionable> EachCheck<R> for NumericalityCheck<R> {
    fn kind(&self) -> &str {
        "numericality"
    }

    fn check_validity(&self) -> CautionResult<()> {
        for check in &self.checks {
            if let NumericCheck::Compare(comparison, Threshold::Literal(n)) = check {
                if !n.is_finite() {
                    return Err(CautionError::config(format!(
                        "numericality `{}` must be a finite number",
                        comparison.key()
                    )));
                }
            }
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
        let raw = match record.read_attribute_before_type_cast(attribute) {
            Some(raw) if raw != *value => raw,
            _ => value.clone(),
        };
        if options.allow_nil && raw.is_null() {
            return Ok(());
        }

        let Some(number) = parse_number(&raw) else {
            return record.warnings_mut().add_with(
                attribute,
                Message::key("not_a_number"),
                options.add_options(raw),
            );
        };

        if self.only_integer.holds(record) && !is_integer(&raw) {
            return record.warnings_mut().add_with(
                attribute,
                Message::key("not_an_integer"),
                options.add_options(raw),
            );
        }

        let reported = match &raw {
            Value::Number(_) => raw.clone(),
            _ => Number::from_f64(number).map_or(Value::Null, Value::Number),
        };

        for check in &self.checks {
            match check {
                NumericCheck::Odd | NumericCheck::Even => {
                    let odd = number.trunc() % 2.0 != 0.0;
                    let wants_odd = matches!(check, NumericCheck::Odd);
                    if odd != wants_odd {
                        let key = if wants_odd { "odd" } else { "even" };
                        record.warnings_mut().add_with(
                            attribute,
                            Message::key(key),
                            options.add_options(reported.clone()),
                        )?;
                    }
                }
                NumericCheck::Compare(comparison, threshold) => {
                    let threshold = threshold.resolve(record)?;
                    if !comparison.holds(number, threshold) {
                        record.warnings_mut().add_with(
                            attribute,
                            Message::key(comparison.key()),
                            options
                                .add_options(reported.clone())
                                .interpolate("count", threshold),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
