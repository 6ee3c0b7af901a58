//! Base cautioner shapes: whole-record and per-attribute.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::debug;

use caution_contracts::{value, Attribute, CautionError, CautionResult};

use crate::{
    options::CautionOptions,
    traits::{Cautionable, Cautioner},
};

/// The per-value check an `EachCautioner` delegates to.
///
/// Implemented by every built-in rule kind; the iteration, value reading,
/// and nil/blank skipping live in `EachCautioner`.
pub trait EachCheck<R: Cautionable>: Send + Sync {
    fn kind(&self) -> &str;

    fn check_validity(&self) -> CautionResult<()> {
        Ok(())
    }

    fn caution_each(
        &self,
        record: &mut R,
        attribute: &Attribute,
        value: &Value,
        options: &CautionOptions<R>,
    ) -> CautionResult<()>;
}

/// Applies one `EachCheck` to each of a list of attributes.
pub struct EachCautioner<R: Cautionable> {
    attributes: Vec<Attribute>,
    options: CautionOptions<R>,
    check: Box<dyn EachCheck<R>>,
}

impl<R: Cautionable> fmt::Debug for EachCautioner<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EachCautioner")
            .field("kind", &self.check.kind())
            .field("attributes", &self.attributes)
            .field("options", &self.options)
            .finish()
    }
}

impl<R: Cautionable> EachCautioner<R> {
    /// Fails with a configuration error when `attributes` is empty.
    pub fn new<A: Into<Attribute>>(
        attributes: impl IntoIterator<Item = A>,
        options: CautionOptions<R>,
        check: impl EachCheck<R> + 'static,
    ) -> CautionResult<Self> {
        let attributes: Vec<Attribute> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(CautionError::config(format!(
                "{} cautioner needs at least one attribute",
                check.kind()
            )));
        }
        Ok(Self {
            attributes,
            options,
            check: Box::new(check),
        })
    }

    /// Per-attribute cautioner from a closure over `(record, attribute, value)`.
    pub fn from_fn<A: Into<Attribute>>(
        attributes: impl IntoIterator<Item = A>,
        options: CautionOptions<R>,
        f: impl Fn(&mut R, &Attribute, &Value) -> CautionResult<()> + Send + Sync + 'static,
    ) -> CautionResult<Self> {
        Self::new(attributes, options, FnCheck { f })
    }

    pub fn check(&self) -> &dyn EachCheck<R> {
        self.check.as_ref()
    }

    fn skips(&self, value: &Value) -> bool {
        (self.options.allow_nil && value.is_null())
            || (self.options.allow_blank && value::is_blank(value))
    }
}

impl<R: Cautionable> Cautioner<R> for EachCautioner<R> {
    fn kind(&self) -> &str {
        self.check.kind()
    }

    fn options(&self) -> &CautionOptions<R> {
        &self.options
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn check_validity(&self) -> CautionResult<()> {
        self.check.check_validity()
    }

    fn caution(&self, record: &mut R) -> CautionResult<()> {
        for attribute in &self.attributes {
            let value =
                record.read_attribute_for_cautioning(attribute, self.options.value.as_ref())?;
            if self.skips(&value) {
                debug!(kind = self.kind(), attribute = %attribute, "value skipped");
                continue;
            }
            self.check
                .caution_each(record, attribute, &value, &self.options)?;
        }
        Ok(())
    }
}

struct FnCheck<F> {
    f: F,
}

impl<R, F> EachCheck<R> for FnCheck<F>
where
    R: Cautionable,
    F: Fn(&mut R, &Attribute, &Value) -> CautionResult<()> + Send + Sync,
{
    fn kind(&self) -> &str {
        "block"
    }

    fn caution_each(
        &self,
        record: &mut R,
        attribute: &Attribute,
        value: &Value,
        _options: &CautionOptions<R>,
    ) -> CautionResult<()> {
        (self.f)(record, attribute, value)
    }
}

type RecordCheck<R> = Arc<dyn Fn(&mut R, &CautionOptions<R>) -> CautionResult<()> + Send + Sync>;

/// A cautioner that looks at the whole record rather than one attribute.
pub struct RecordCautioner<R: Cautionable> {
    kind: String,
    options: CautionOptions<R>,
    check: RecordCheck<R>,
}

impl<R: Cautionable> RecordCautioner<R> {
    pub fn new(
        kind: impl Into<String>,
        options: CautionOptions<R>,
        check: impl Fn(&mut R, &CautionOptions<R>) -> CautionResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            options,
            check: Arc::new(check),
        }
    }
}

impl<R: Cautionable> Cautioner<R> for RecordCautioner<R> {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn options(&self) -> &CautionOptions<R> {
        &self.options
    }

    fn caution(&self, record: &mut R) -> CautionResult<()> {
        (self.check)(record, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    use caution_contracts::{Attribute, CautionError};

    use super::*;
    use crate::testing::{empty_registry, Sample};

    fn record_length(record: &mut Sample, attribute: &Attribute, value: &Value) -> CautionResult<()> {
        record
            .warnings_mut()
            .add(attribute, format!("saw {}", value::to_text(value)))
    }

    #[test]
    fn empty_attribute_list_is_rejected() {
        let err = EachCautioner::<Sample>::from_fn(Vec::<&str>::new(), CautionOptions::new(), record_length)
            .unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { .. }));
    }

    #[test]
    fn each_attribute_is_checked_in_order() {
        let cautioner = EachCautioner::from_fn(["name", "mood"], CautionOptions::new(), record_length)
            .expect("valid");
        let mut record = Sample::new(empty_registry())
            .with("name", json!("Rex"))
            .with("mood", json!("glum"));
        cautioner.caution(&mut record).expect("runs");
        assert_eq!(record.warnings().get("name"), ["saw Rex".to_string()]);
        assert_eq!(record.warnings().get("mood"), ["saw glum".to_string()]);
        assert_eq!(cautioner.kind(), "block");
        assert_eq!(cautioner.attributes().len(), 2);
    }

    #[test]
    fn allow_nil_skips_null_and_allow_blank_skips_blank() {
        let nil_ok = EachCautioner::from_fn(["name"], CautionOptions::new().allow_nil(), record_length)
            .expect("valid");
        let blank_ok = EachCautioner::from_fn(["name"], CautionOptions::new().allow_blank(), record_length)
            .expect("valid");

        let mut record = Sample::new(empty_registry());
        nil_ok.caution(&mut record).expect("runs");
        assert!(record.warnings().is_empty());

        let mut record = Sample::new(empty_registry()).with("name", json!("   "));
        nil_ok.caution(&mut record).expect("runs");
        assert_eq!(record.warnings().size(), 1);

        let mut record = Sample::new(empty_registry()).with("name", json!("   "));
        blank_ok.caution(&mut record).expect("runs");
        assert!(record.warnings().is_empty());
    }

    #[test]
    fn value_override_replaces_the_attribute() {
        let cautioner = EachCautioner::from_fn(
            ["mood"],
            CautionOptions::new().value_from(|s: &Sample| json!(s.attr("mood").as_str().unwrap_or_default().chars().rev().collect::<String>())),
            record_length,
        )
        .expect("valid");
        let mut record = Sample::new(empty_registry()).with("mood", json!("mood"));
        cautioner.caution(&mut record).expect("runs");
        assert_eq!(record.warnings().get("mood"), ["saw doom".to_string()]);
    }

    #[test]
    fn raw_value_needs_payload_support() {
        let cautioner = EachCautioner::from_fn(
            ["age"],
            CautionOptions::new().rawtext_value("age_text"),
            record_length,
        )
        .expect("valid");

        let mut record = Sample::new(empty_registry());
        let err = cautioner.caution(&mut record).unwrap_err();
        assert!(matches!(err, CautionError::Unsupported { .. }));

        let mut raw = Map::new();
        raw.insert("age_text".to_string(), json!("very old"));
        let mut record = Sample::new(empty_registry()).with_raw(raw);
        cautioner.caution(&mut record).expect("runs");
        assert_eq!(record.warnings().get("age"), ["saw very old".to_string()]);
    }

    #[test]
    fn record_cautioner_sees_whole_record() {
        let cautioner = RecordCautioner::new("tel_length", CautionOptions::new(), |s: &mut Sample, _| {
            if s.attr("tel").as_str().map_or(0, str::len) < 11 {
                s.warnings_mut().add(Attribute::base(), "Contact number is less than 11 digits")?;
            }
            Ok(())
        });
        let mut record = Sample::new(empty_registry()).with("tel", json!("123"));
        cautioner.caution(&mut record).expect("runs");
        assert_eq!(
            record.warnings().full_messages(),
            vec!["Contact number is less than 11 digits".to_string()]
        );
        assert!(cautioner.attributes().is_empty());
    }
}
