//! Rule kinds addressable by tag, and the `Rule` value accepted by
//! `RuleDsl::cautions`.

use std::{fmt, str::FromStr};

use caution_contracts::{Attribute, CautionError, CautionResult};
use caution_core::{CautionOptions, Cautionable, EachCautioner};

use crate::{
    format::FormatCheck,
    inclusion::{InclusionCheck, Membership},
    numericality::NumericalityCheck,
    presence::PresenceCheck,
};

/// The closed set of built-in rule tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Presence,
    Format,
    Inclusion,
    Numericality,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Presence,
        RuleKind::Format,
        RuleKind::Inclusion,
        RuleKind::Numericality,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Format => "format",
            Self::Inclusion => "inclusion",
            Self::Numericality => "numericality",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for RuleKind {
    type Err = CautionError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| {
                CautionError::config(format!(
                    "unknown cautioner '{tag}'; expected one of presence, format, inclusion, numericality"
                ))
            })
    }
}

/// The check half of a `Rule`.
pub enum RuleCheck<R> {
    Presence(PresenceCheck),
    Format(FormatCheck<R>),
    Inclusion(InclusionCheck),
    Numericality(NumericalityCheck<R>),
}

impl<R> fmt::Debug for RuleCheck<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence(check) => fmt::Debug::fmt(check, f),
            Self::Format(check) => fmt::Debug::fmt(check, f),
            Self::Inclusion(check) => fmt::Debug::fmt(check, f),
            Self::Numericality(check) => fmt::Debug::fmt(check, f),
        }
    }
}

/// One rule of a `cautions(...)` declaration: a check plus the options
/// that apply to it alone.
pub struct Rule<R> {
    check: RuleCheck<R>,
    options: CautionOptions<R>,
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("check", &self.check)
            .field("options", &self.options)
            .finish()
    }
}

impl<R: Cautionable> Rule<R> {
    pub fn new(check: RuleCheck<R>) -> Self {
        Self {
            check,
            options: CautionOptions::new(),
        }
    }

    pub fn presence() -> Self {
        Self::new(RuleCheck::Presence(PresenceCheck))
    }

    pub fn format(check: FormatCheck<R>) -> Self {
        Self::new(RuleCheck::Format(check))
    }

    pub fn inclusion(within: impl Into<Membership>) -> Self {
        Self::new(RuleCheck::Inclusion(InclusionCheck::new(within)))
    }

    pub fn numericality(check: NumericalityCheck<R>) -> Self {
        Self::new(RuleCheck::Numericality(check))
    }

    pub fn with_options(mut self, options: CautionOptions<R>) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> RuleKind {
        match self.check {
            RuleCheck::Presence(_) => RuleKind::Presence,
            RuleCheck::Format(_) => RuleKind::Format,
            RuleCheck::Inclusion(_) => RuleKind::Inclusion,
            RuleCheck::Numericality(_) => RuleKind::Numericality,
        }
    }

    /// Build the cautioner for `attributes`, layering this rule's options
    /// over the declaration's shared ones.
    pub fn into_cautioner(
        self,
        attributes: Vec<Attribute>,
        shared: &CautionOptions<R>,
    ) -> CautionResult<EachCautioner<R>> {
        let options = self.options.merged_over(shared);
        match self.check {
            RuleCheck::Presence(check) => EachCautioner::new(attributes, options, check),
            RuleCheck::Format(check) => EachCautioner::new(attributes, options, check),
            RuleCheck::Inclusion(check) => EachCautioner::new(attributes, options, check),
            RuleCheck::Numericality(check) => EachCautioner::new(attributes, options, check),
        }
    }
}

#[cfg(test)]
mod tests {
    use caution_contracts::CautionError;

    use super::*;
    use crate::testing::Record;

    #[test]
    fn tags_resolve_to_kinds() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.tag().parse::<RuleKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.tag());
        }
    }

    #[test]
    fn unknown_tag_is_a_config_error() {
        let err = "length".parse::<RuleKind>().unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { ref reason } if reason.contains("'length'")));
    }

    #[test]
    fn rule_reports_its_kind() {
        assert_eq!(Rule::<Record>::presence().kind(), RuleKind::Presence);
        assert_eq!(Rule::<Record>::inclusion(1..=3_i64).kind(), RuleKind::Inclusion);
        assert_eq!(
            Rule::<Record>::numericality(NumericalityCheck::new()).kind(),
            RuleKind::Numericality
        );
    }
}
