//! Delegate-to-method: run a named record method as a cautioner.

use caution_contracts::{Attribute, CautionError, CautionResult};
use caution_core::{CautionOptions, Cautionable, Cautioner};

/// The method to call, with or without the attribute name.
pub enum MethodTarget<R> {
    Record(fn(&mut R) -> CautionResult<()>),
    Attribute(fn(&mut R, &Attribute) -> CautionResult<()>),
}

impl<R> Clone for MethodTarget<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Record(f) => Self::Record(*f),
            Self::Attribute(f) => Self::Attribute(*f),
        }
    }
}

pub struct MethodCautioner<R: Cautionable> {
    name: String,
    attributes: Vec<Attribute>,
    options: CautionOptions<R>,
    target: MethodTarget<R>,
}

impl<R: Cautionable> MethodCautioner<R> {
    /// `attributes` are required for `MethodTarget::Attribute`, which is
    /// called once per attribute. A `Record` target is called once; any
    /// attributes only file it for introspection.
    pub fn new<A: Into<Attribute>>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = A>,
        target: MethodTarget<R>,
        options: CautionOptions<R>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            options,
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R: Cautionable> Cautioner<R> for MethodCautioner<R> {
    fn kind(&self) -> &str {
        "method"
    }

    fn options(&self) -> &CautionOptions<R> {
        &self.options
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn check_validity(&self) -> CautionResult<()> {
        if matches!(self.target, MethodTarget::Attribute(_)) && self.attributes.is_empty() {
            return Err(CautionError::config(format!(
                "method '{}' takes an attribute but none were given",
                self.name
            )));
        }
        Ok(())
    }

    fn caution(&self, record: &mut R) -> CautionResult<()> {
        match self.target {
            MethodTarget::Record(f) => f(record),
            MethodTarget::Attribute(f) => {
                for attribute in &self.attributes {
                    f(record, attribute)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use caution_contracts::{Attribute, CautionError, CautionResult};
    use caution_core::{CautionOptions, Cautionable, RegistryBuilder};

    use super::*;
    use crate::{
        testing::{builder, registry, Record},
        RuleDsl,
    };

    fn warn_short_tel(record: &mut Record) -> CautionResult<()> {
        if record.attr("tel").as_str().map_or(0, str::len) < 11 {
            record
                .warnings_mut()
                .add(Attribute::base(), "Contact number is less than 11 digits")?;
        }
        Ok(())
    }

    fn warn_shouting(record: &mut Record, attribute: &Attribute) -> CautionResult<()> {
        let text = record.attr(attribute.as_str());
        if text.as_str().is_some_and(|s| !s.is_empty() && s == s.to_uppercase()) {
            record.warnings_mut().add(attribute, "is shouting")?;
        }
        Ok(())
    }

    #[test]
    fn record_method_runs_once() {
        let registry = registry("person", |b| {
            b.cautions_with_method("warn_short_tel", Vec::<&str>::new(), MethodTarget::Record(warn_short_tel), CautionOptions::new())?;
            Ok(())
        });
        let mut record = Record::new(registry).with("tel", json!("0123"));
        assert!(!record.is_safe(None).unwrap());
        assert_eq!(
            record.warnings().full_messages(),
            vec!["Contact number is less than 11 digits".to_string()]
        );
    }

    #[test]
    fn attribute_method_runs_per_attribute() {
        let registry = registry("person", |b| {
            b.cautions_with_method(
                "warn_shouting",
                ["name", "mood"],
                MethodTarget::Attribute(warn_shouting),
                CautionOptions::new(),
            )?;
            Ok(())
        });
        let mut record = Record::new(registry)
            .with("name", json!("FRED"))
            .with("mood", json!("calm"));
        record.is_safe(None).unwrap();
        assert_eq!(record.warnings().keys().len(), 1);
        assert_eq!(record.warnings().get("name"), ["is shouting".to_string()]);
        assert_eq!(registry.cautioners_on(&["mood"]).len(), 1);
    }

    #[test]
    fn attribute_method_without_attributes_is_rejected() {
        let mut b: RegistryBuilder<Record> = builder("person");
        let err = b
            .cautions_with_method(
                "warn_shouting",
                Vec::<&str>::new(),
                MethodTarget::Attribute(warn_shouting),
                CautionOptions::new(),
            )
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { .. }));
    }
}
