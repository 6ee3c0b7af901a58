//! Declaration sugar for the built-in rule kinds.

use tracing::debug;

use caution_contracts::{Attribute, CautionError, CautionResult};
use caution_core::{CautionOptions, Cautionable, EachCautioner, RegistryBuilder};

use crate::{
    format::FormatCheck,
    inclusion::{InclusionCheck, Membership},
    kind::Rule,
    method::{MethodCautioner, MethodTarget},
    numericality::NumericalityCheck,
    presence::PresenceCheck,
};

/// Adds the built-in rule kinds to `RegistryBuilder`.
pub trait RuleDsl<R: Cautionable> {
    /// Declare several rules over the same attributes. `shared` applies to
    /// every rule; each rule's own options layer over it.
    fn cautions<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        shared: CautionOptions<R>,
        rules: Vec<Rule<R>>,
    ) -> CautionResult<&mut Self>;

    fn cautions_presence_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self>;

    fn cautions_format_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        check: FormatCheck<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self>;

    fn cautions_inclusion_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        within: impl Into<Membership>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self>;

    fn cautions_numericality_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        check: NumericalityCheck<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self>;

    fn cautions_with_method<A: Into<Attribute>>(
        &mut self,
        name: &str,
        attributes: impl IntoIterator<Item = A>,
        target: MethodTarget<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self>;
}

impl<R: Cautionable> RuleDsl<R> for RegistryBuilder<R> {
    fn cautions<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        shared: CautionOptions<R>,
        rules: Vec<Rule<R>>,
    ) -> CautionResult<&mut Self> {
        let attributes: Vec<Attribute> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(CautionError::config("cautions needs at least one attribute"));
        }
        if rules.is_empty() {
            return Err(CautionError::config("cautions needs at least one rule"));
        }

        for rule in rules {
            debug!(kind = %rule.kind(), attributes = ?attributes, "declaring rule");
            let cautioner = rule.into_cautioner(attributes.clone(), &shared)?;
            self.cautions_with(cautioner)?;
        }
        Ok(self)
    }

    fn cautions_presence_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self> {
        self.cautions_with(EachCautioner::new(attributes, options, PresenceCheck)?)
    }

    fn cautions_format_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        check: FormatCheck<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self> {
        self.cautions_with(EachCautioner::new(attributes, options, check)?)
    }

    fn cautions_inclusion_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        within: impl Into<Membership>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self> {
        let check = InclusionCheck::new(within);
        self.cautions_with(EachCautioner::new(attributes, options, check)?)
    }

    fn cautions_numericality_of<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        check: NumericalityCheck<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self> {
        self.cautions_with(EachCautioner::new(attributes, options, check)?)
    }

    fn cautions_with_method<A: Into<Attribute>>(
        &mut self,
        name: &str,
        attributes: impl IntoIterator<Item = A>,
        target: MethodTarget<R>,
        options: CautionOptions<R>,
    ) -> CautionResult<&mut Self> {
        self.cautions_with(MethodCautioner::new(name, attributes, target, options))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use serde_json::json;

    use caution_contracts::CautionError;
    use caution_core::{CautionOptions, Cautionable, RegistryBuilder};

    use super::*;
    use crate::testing::{builder, registry, Record};

    // ── Argument checks ──────────────────────────────────────────────────────

    #[test]
    fn cautions_needs_attributes_and_rules() {
        let mut b: RegistryBuilder<Record> = builder("person");
        let err = b
            .cautions(Vec::<&str>::new(), CautionOptions::new(), vec![Rule::presence()])
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { .. }));

        let err = b
            .cautions(["name"], CautionOptions::new(), Vec::new())
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { .. }));
    }

    // ── Multi-rule declarations ──────────────────────────────────────────────

    #[test]
    fn one_cautioner_per_rule_in_order() {
        let registry = registry("person", |b| {
            b.cautions(
                ["height_in_inches"],
                CautionOptions::new().allow_nil(),
                vec![
                    Rule::numericality(NumericalityCheck::new().only_integer()),
                    Rule::inclusion(1..=100_i64)
                        .with_options(CautionOptions::new().message("is a ridiculous height")),
                ],
            )?;
            Ok(())
        });

        let kinds: Vec<&str> = registry.steps().iter().map(|s| s.name()).collect();
        assert_eq!(kinds, vec!["numericality", "inclusion"]);

        let mut record = Record::new(registry).with("height_in_inches", json!(500));
        assert!(!record.is_safe(None).unwrap());
        assert_eq!(
            record.warnings().get("height_in_inches"),
            ["is a ridiculous height".to_string()]
        );

        let mut record = Record::new(registry).with("height_in_inches", json!(12.5));
        record.is_safe(None).unwrap();
        assert_eq!(
            record.warnings().get("height_in_inches"),
            ["must be an integer".to_string()]
        );

        let mut record = Record::new(registry);
        assert!(record.is_safe(None).unwrap());
    }

    #[test]
    fn shared_guards_apply_to_every_rule() {
        let registry = registry("pet", |b| {
            b.cautions(
                ["name"],
                CautionOptions::new().on(["create"]),
                vec![
                    Rule::presence(),
                    Rule::format(FormatCheck::not_matching(Regex::new("[0-9]").unwrap())),
                ],
            )?;
            Ok(())
        });

        let mut record = Record::new(registry).with("name", json!("R2"));
        assert!(record.is_safe(None).unwrap());
        assert!(!record.is_safe(Some("create".into())).unwrap());
        assert_eq!(record.warnings().get("name"), ["is invalid".to_string()]);
    }
}
