//! Rule sets declared in TOML.
//!
//! Each `[[cautions]]` table names its attributes, any options shared by
//! all of its rules, and one key per rule kind. Rules are declared in the
//! order they appear in the table.
//!
//! ```toml
//! [[cautions]]
//! attributes = ["height_in_inches"]
//! allow_nil = true
//! numericality = { only_integer = true }
//! inclusion = { in = { min = 1, max = 100 }, message = "is a ridiculous height" }
//!
//! [[cautions]]
//! attributes = ["name"]
//! format = { without = "[0-9]", message = "can't contain numbers" }
//! ```
//!
//! Rule values accept shorthands: `presence = true`, `numericality = true`,
//! `format = "<pattern>"` (meaning `with`), and `inclusion = [..]`.

use std::{path::Path, str::FromStr};

use regex::Regex;
use serde::Deserialize;
use toml::{Table, Value as TomlValue};
use tracing::{debug, info};

use caution_contracts::{CautionError, CautionResult};
use caution_core::{CautionOptions, Cautionable, RegistryBuilder};

use crate::{
    dsl::RuleDsl,
    format::FormatCheck,
    inclusion::Membership,
    kind::{Rule, RuleKind},
    numericality::{Comparison, NumericalityCheck, Threshold},
};

/// Keys that configure how a rule runs rather than what it checks.
const OPTION_KEYS: [&str; 6] = ["allow_nil", "allow_blank", "active", "strict", "message", "on"];

/// One context name or several.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Options shared by a declaration or given to a single rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    #[serde(default)]
    pub allow_nil: bool,

    #[serde(default)]
    pub allow_blank: bool,

    /// Warnings from this rule must be confirmed before saving.
    #[serde(default)]
    pub active: bool,

    /// Fail immediately instead of recording the warning.
    #[serde(default)]
    pub strict: bool,

    /// Literal message text replacing the kind's default.
    #[serde(default)]
    pub message: Option<String>,

    /// Only run in these validation contexts.
    #[serde(default)]
    pub on: Option<OneOrMany>,
}

impl OptionsConfig {
    pub fn to_options<R: Cautionable>(&self) -> CautionOptions<R> {
        let mut options = CautionOptions::new();
        if self.allow_nil {
            options = options.allow_nil();
        }
        if self.allow_blank {
            options = options.allow_blank();
        }
        if self.active {
            options = options.active();
        }
        if self.strict {
            options = options.strict();
        }
        if let Some(message) = &self.message {
            options = options.message(message.as_str());
        }
        match &self.on {
            Some(OneOrMany::One(context)) => options.on([context.as_str()]),
            Some(OneOrMany::Many(contexts)) => options.on(contexts.iter().map(String::as_str)),
            None => options,
        }
    }

    fn from_table(table: Table, owner: &str) -> CautionResult<Self> {
        Self::deserialize(TomlValue::Table(table))
            .map_err(|e| CautionError::config(format!("invalid options for {owner}: {e}")))
    }
}

/// A numericality threshold as written in TOML.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdConfig {
    Literal(f64),
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericConfig {
    Compare(Comparison, ThresholdConfig),
    Odd,
    Even,
}

/// What a single rule checks.
#[derive(Debug, Clone)]
pub enum RuleBody {
    Presence,
    Format {
        with: Option<Regex>,
        without: Option<Regex>,
    },
    Inclusion(Membership),
    Numericality {
        only_integer: bool,
        checks: Vec<NumericConfig>,
    },
}

#[derive(Debug, Clone)]
pub struct RuleConfig {
    pub kind: RuleKind,
    pub options: OptionsConfig,
    pub body: RuleBody,
}

impl RuleConfig {
    pub fn to_rule<R: Cautionable>(&self) -> Rule<R> {
        let rule = match &self.body {
            RuleBody::Presence => Rule::presence(),
            RuleBody::Format { with, without } => {
                let mut check = FormatCheck::new();
                if let Some(pattern) = with {
                    check = check.with(pattern.clone());
                }
                if let Some(pattern) = without {
                    check = check.without(pattern.clone());
                }
                Rule::format(check)
            }
            RuleBody::Inclusion(membership) => Rule::inclusion(membership.clone()),
            RuleBody::Numericality {
                only_integer,
                checks,
            } => {
                let mut check = NumericalityCheck::new();
                if *only_integer {
                    check = check.only_integer();
                }
                for numeric in checks {
                    check = match numeric {
                        NumericConfig::Compare(comparison, ThresholdConfig::Literal(n)) => {
                            check.compare(*comparison, *n)
                        }
                        NumericConfig::Compare(comparison, ThresholdConfig::Attribute(name)) => {
                            check.compare(*comparison, Threshold::attribute(name.as_str()))
                        }
                        NumericConfig::Odd => check.odd(),
                        NumericConfig::Even => check.even(),
                    };
                }
                Rule::numericality(check)
            }
        };
        rule.with_options(self.options.to_options())
    }
}

/// One `[[cautions]]` table.
#[derive(Debug, Clone)]
pub struct CautionDeclaration {
    pub attributes: Vec<String>,
    pub shared: OptionsConfig,
    pub rules: Vec<RuleConfig>,
}

/// A parsed TOML rule set, ready to be applied to a registry builder.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    declarations: Vec<CautionDeclaration>,
}

impl RuleSet {
    pub fn from_toml_str(toml_str: &str) -> CautionResult<Self> {
        let mut document: Table = toml::from_str(toml_str).map_err(|e| {
            CautionError::config(format!("failed to parse caution rules TOML: {e}"))
        })?;

        let entries = match document.remove("cautions") {
            None => Vec::new(),
            Some(TomlValue::Array(entries)) => entries,
            Some(other) => {
                return Err(CautionError::config(format!(
                    "`cautions` must be an array of tables, got {}",
                    other.type_str()
                )))
            }
        };
        if let Some(key) = document.keys().next() {
            return Err(CautionError::config(format!(
                "unknown top-level key '{key}' in caution rules"
            )));
        }

        let declarations = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_declaration(index, entry))
            .collect::<CautionResult<Vec<_>>>()?;

        debug!(declarations = declarations.len(), "caution rules parsed");
        Ok(Self { declarations })
    }

    pub fn from_file(path: &Path) -> CautionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CautionError::config(format!(
                "failed to read rules file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn declarations(&self) -> &[CautionDeclaration] {
        &self.declarations
    }

    /// Declare every rule of the set on `builder`, in file order.
    pub fn apply<R: Cautionable>(&self, builder: &mut RegistryBuilder<R>) -> CautionResult<()> {
        for declaration in &self.declarations {
            let rules: Vec<Rule<R>> = declaration.rules.iter().map(RuleConfig::to_rule).collect();
            builder.cautions(
                declaration.attributes.iter().map(String::as_str),
                declaration.shared.to_options(),
                rules,
            )?;
        }
        info!(
            model = %builder.renderer().naming().i18n_key,
            declarations = self.declarations.len(),
            "caution rules applied"
        );
        Ok(())
    }
}

fn parse_declaration(index: usize, entry: TomlValue) -> CautionResult<CautionDeclaration> {
    let owner = format!("cautions[{index}]");
    let TomlValue::Table(table) = entry else {
        return Err(CautionError::config(format!("{owner} must be a table")));
    };

    let mut attributes = Vec::new();
    let mut shared = Table::new();
    let mut rules = Vec::new();
    for (key, value) in table {
        if key == "attributes" {
            attributes = Vec::<String>::deserialize(value).map_err(|e| {
                CautionError::config(format!("{owner}.attributes must be a list of names: {e}"))
            })?;
        } else if OPTION_KEYS.contains(&key.as_str()) {
            shared.insert(key, value);
        } else {
            let kind = RuleKind::from_str(&key)?;
            rules.push(parse_rule(kind, value)?);
        }
    }

    if attributes.is_empty() {
        return Err(CautionError::config(format!(
            "{owner} needs at least one attribute"
        )));
    }
    if rules.is_empty() {
        return Err(CautionError::config(format!("{owner} needs at least one rule")));
    }

    Ok(CautionDeclaration {
        attributes,
        shared: OptionsConfig::from_table(shared, &owner)?,
        rules,
    })
}

fn parse_rule(kind: RuleKind, value: TomlValue) -> CautionResult<RuleConfig> {
    let (body, options) = match kind {
        RuleKind::Presence => parse_presence(value)?,
        RuleKind::Format => parse_format(value)?,
        RuleKind::Inclusion => parse_inclusion(value)?,
        RuleKind::Numericality => parse_numericality(value)?,
    };
    Ok(RuleConfig {
        kind,
        options: OptionsConfig::from_table(options, kind.tag())?,
        body,
    })
}

/// Split a rule table into the kind's own keys and the general options.
fn split(kind: RuleKind, value: TomlValue) -> CautionResult<(Table, Table)> {
    let table = match value {
        TomlValue::Table(table) => table,
        other => {
            return Err(CautionError::config(format!(
                "`{kind}` expects a table, got {}",
                other.type_str()
            )))
        }
    };
    let mut own = Table::new();
    let mut options = Table::new();
    for (key, value) in table {
        if OPTION_KEYS.contains(&key.as_str()) {
            options.insert(key, value);
        } else {
            own.insert(key, value);
        }
    }
    Ok((own, options))
}

fn unknown_key(kind: RuleKind, key: &str) -> CautionError {
    CautionError::config(format!("unknown `{kind}` option '{key}'"))
}

fn parse_presence(value: TomlValue) -> CautionResult<(RuleBody, Table)> {
    if let TomlValue::Boolean(true) = value {
        return Ok((RuleBody::Presence, Table::new()));
    }
    let (own, options) = split(RuleKind::Presence, value)?;
    if let Some(key) = own.keys().next() {
        return Err(unknown_key(RuleKind::Presence, key));
    }
    Ok((RuleBody::Presence, options))
}

fn compile(kind: &str, value: TomlValue) -> CautionResult<Regex> {
    let pattern = match value {
        TomlValue::String(pattern) => pattern,
        other => {
            return Err(CautionError::config(format!(
                "format `{kind}` must be a pattern string, got {}",
                other.type_str()
            )))
        }
    };
    Regex::new(&pattern)
        .map_err(|e| CautionError::config(format!("invalid format pattern '{pattern}': {e}")))
}

fn parse_format(value: TomlValue) -> CautionResult<(RuleBody, Table)> {
    if let TomlValue::String(_) = value {
        let body = RuleBody::Format {
            with: Some(compile("with", value)?),
            without: None,
        };
        return Ok((body, Table::new()));
    }

    let (own, options) = split(RuleKind::Format, value)?;
    let mut with = None;
    let mut without = None;
    for (key, value) in own {
        match key.as_str() {
            "with" => with = Some(compile("with", value)?),
            "without" => without = Some(compile("without", value)?),
            other => return Err(unknown_key(RuleKind::Format, other)),
        }
    }
    Ok((RuleBody::Format { with, without }, options))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RangeConfig {
    min: i64,
    max: i64,
    #[serde(default)]
    exclusive: bool,
}

fn membership(value: TomlValue) -> CautionResult<Membership> {
    match value {
        TomlValue::Array(items) => {
            let items = serde_json::Value::deserialize(TomlValue::Array(items))
                .map_err(|e| CautionError::config(format!("invalid inclusion list: {e}")))?;
            match items {
                serde_json::Value::Array(items) => Ok(Membership::List(items)),
                _ => Err(CautionError::config("invalid inclusion list")),
            }
        }
        TomlValue::Table(table) => {
            let range = RangeConfig::deserialize(TomlValue::Table(table))
                .map_err(|e| CautionError::config(format!("invalid inclusion range: {e}")))?;
            Ok(if range.exclusive {
                Membership::from(range.min..range.max)
            } else {
                Membership::from(range.min..=range.max)
            })
        }
        other => Err(CautionError::config(format!(
            "inclusion expects a list or a range table, got {}",
            other.type_str()
        ))),
    }
}

fn parse_inclusion(value: TomlValue) -> CautionResult<(RuleBody, Table)> {
    if let TomlValue::Array(_) = value {
        return Ok((RuleBody::Inclusion(membership(value)?), Table::new()));
    }

    let (own, options) = split(RuleKind::Inclusion, value)?;
    let mut within = None;
    for (key, value) in own {
        match key.as_str() {
            "in" => within = Some(membership(value)?),
            other => return Err(unknown_key(RuleKind::Inclusion, other)),
        }
    }
    let within =
        within.ok_or_else(|| CautionError::config("`inclusion` needs an `in` list or range"))?;
    Ok((RuleBody::Inclusion(within), options))
}

fn parse_numericality(value: TomlValue) -> CautionResult<(RuleBody, Table)> {
    let empty = RuleBody::Numericality {
        only_integer: false,
        checks: Vec::new(),
    };
    if let TomlValue::Boolean(true) = value {
        return Ok((empty, Table::new()));
    }

    let (own, options) = split(RuleKind::Numericality, value)?;
    let mut only_integer = false;
    let mut checks = Vec::new();
    for (key, value) in own {
        match (key.as_str(), value) {
            ("only_integer", TomlValue::Boolean(flag)) => only_integer = flag,
            ("odd", TomlValue::Boolean(flag)) => {
                if flag {
                    checks.push(NumericConfig::Odd);
                }
            }
            ("even", TomlValue::Boolean(flag)) => {
                if flag {
                    checks.push(NumericConfig::Even);
                }
            }
            (name @ ("only_integer" | "odd" | "even"), other) => {
                return Err(CautionError::config(format!(
                    "numericality `{name}` must be a boolean, got {}",
                    other.type_str()
                )))
            }
            (name, value) => {
                let comparison = Comparison::from_str(name)?;
                let threshold = match value {
                    TomlValue::Integer(n) => ThresholdConfig::Literal(n as f64),
                    TomlValue::Float(n) => ThresholdConfig::Literal(n),
                    TomlValue::String(attribute) => ThresholdConfig::Attribute(attribute),
                    other => {
                        return Err(CautionError::config(format!(
                            "numericality `{name}` must be a number or an attribute name, got {}",
                            other.type_str()
                        )))
                    }
                };
                checks.push(NumericConfig::Compare(comparison, threshold));
            }
        }
    }
    Ok((
        RuleBody::Numericality {
            only_integer,
            checks,
        },
        options,
    ))
}
