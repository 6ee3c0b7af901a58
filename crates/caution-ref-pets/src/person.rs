//! `Person`: a plain record that only asks whether it is safe.

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use caution_contracts::{Attribute, CautionResult, ModelNaming};
use caution_core::{
    Callback, CautionOptions, CautionRegistry, CautionState, Cautionable, Condition, Conditions,
};
use caution_rules::{Membership, NumericalityCheck, Rule, RuleDsl};

use crate::catalog;

const SCOOBY_GANG: [&str; 4] = ["Shaggy", "Fred", "Velma", "Daphne"];

/// Untyped fields hold user input as given, so `age` may be `"very old"`.
#[derive(Debug, Default)]
pub struct Person {
    pub tel: Option<String>,
    pub age: Value,
    pub height_in_inches: Value,
    pub mood: Option<String>,
    pub name: Option<String>,
    pub likes_scooby_snacks: Option<bool>,
    state: CautionState,
}

impl Person {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn in_scooby_gang(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| SCOOBY_GANG.contains(&name))
    }

    fn reversed_mood(&self) -> Value {
        match &self.mood {
            Some(mood) => Value::String(mood.chars().rev().collect()),
            None => Value::Null,
        }
    }

    fn warn_against_short_tel_number(&mut self) -> CautionResult<()> {
        if self.tel.as_ref().is_some_and(|tel| tel.chars().count() < 11) {
            self.warnings_mut()
                .add(Attribute::base(), "Contact number is less than 11 digits")?;
        }
        Ok(())
    }

    fn warn_against_scooby_snack_intolerance(&mut self) -> CautionResult<()> {
        if self.likes_scooby_snacks == Some(true) {
            self.warnings_mut()
                .add("likes_scooby_snacks", "Only Shaggy likes Scooby Snacks")?;
        }
        Ok(())
    }
}

fn declare() -> CautionResult<CautionRegistry<Person>> {
    let mut b = CautionRegistry::builder(ModelNaming::new("person"), Arc::new(catalog()?));

    b.caution(
        Callback::method("warn_against_short_tel_number", Person::warn_against_short_tel_number),
        Conditions::new(),
    );

    b.cautions(
        ["height_in_inches"],
        CautionOptions::new(),
        vec![
            Rule::numericality(NumericalityCheck::new().only_integer())
                .with_options(CautionOptions::new().allow_nil()),
            Rule::inclusion(1..=100_i64).with_options(
                CautionOptions::new()
                    .allow_nil()
                    .message("is a ridiculous height"),
            ),
        ],
    )?;

    b.cautions_numericality_of(["age"], NumericalityCheck::new(), CautionOptions::new().allow_nil())?;

    b.cautions_inclusion_of(
        ["mood"],
        Membership::list(["doom"]),
        CautionOptions::new()
            .value_from(Person::reversed_mood)
            .allow_nil(),
    )?;

    b.cautions_presence_of(
        ["likes_scooby_snacks"],
        CautionOptions::new().only_if(Condition::method("in_scooby_gang", Person::in_scooby_gang)),
    )?;

    b.caution(
        Callback::method(
            "warn_against_scooby_snack_intolerance",
            Person::warn_against_scooby_snack_intolerance,
        ),
        Conditions::new().only_if(Condition::predicate(|p: &Person| {
            p.in_scooby_gang() && p.name.as_deref() != Some("Shaggy")
        })),
    );

    Ok(b.build())
}

/// The cautions every `Person` runs.
///
/// # Panics
///
/// On first use if the declarations are invalid.
pub fn registry() -> &'static CautionRegistry<Person> {
    static REGISTRY: OnceLock<CautionRegistry<Person>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        declare().unwrap_or_else(|e| panic!("Person cautions are misconfigured: {e}"))
    })
}

impl Cautionable for Person {
    fn cautions(&self) -> &'static CautionRegistry<Self> {
        registry()
    }

    fn caution_state(&self) -> &CautionState {
        &self.state
    }

    fn caution_state_mut(&mut self) -> &mut CautionState {
        &mut self.state
    }

    fn read_attribute(&self, attribute: &Attribute) -> Value {
        match attribute.as_str() {
            "tel" => self.tel.clone().into(),
            "age" => self.age.clone(),
            "height_in_inches" => self.height_in_inches.clone(),
            "mood" => self.mood.clone().into(),
            "name" => self.name.clone().into(),
            "likes_scooby_snacks" => self.likes_scooby_snacks.into(),
            _ => Value::Null,
        }
    }
}
