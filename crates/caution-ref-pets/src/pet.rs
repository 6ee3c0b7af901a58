//! `Pet`: a persisted record with its own validation.
//!
//! Saving runs the host checks and then the cautions. A pet that raises an
//! active warning (checking out) is refused until someone confirms it.
//! Dogs run the pet rules plus `rules/dog.toml` through a derived registry.

use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};

use caution_contracts::{value, Attribute, CautionError, CautionResult, Context, ModelNaming};
use caution_core::{
    Callback, CautionRegistry, CautionState, Cautionable, Conditions, Flow, HostValidation,
};
use caution_rules::RuleSet;

use crate::{catalog, errors::HostErrors};

const PET_RULES: &str = include_str!("../rules/pet.toml");
const DOG_RULES: &str = include_str!("../rules/dog.toml");

#[derive(Debug, Default)]
pub struct Pet {
    pub name: Option<String>,
    pub category: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub greeting: Option<String>,
    persisted: bool,
    errors: HostErrors,
    state: CautionState,
}

impl Pet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_greeting(mut self, greeting: &str) -> Self {
        self.greeting = Some(greeting.to_string());
        self
    }

    /// Try to save `pet` and hand it back either way; check
    /// `is_persisted` or `errors` to see how it went.
    pub fn create(mut pet: Pet) -> CautionResult<Pet> {
        pet.save()?;
        Ok(pet)
    }

    /// Validate in the `create` or `update` context and persist on success.
    pub fn save(&mut self) -> CautionResult<bool> {
        let context = if self.persisted {
            Context::update()
        } else {
            Context::create()
        };
        if !self.is_valid(Some(context))? {
            debug!(name = ?self.name, errors = self.errors.len(), "pet not saved");
            return Ok(false);
        }
        self.persisted = true;
        info!(name = ?self.name, "pet saved");
        Ok(true)
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn errors(&self) -> &HostErrors {
        &self.errors
    }

    pub fn is_dog(&self) -> bool {
        self.category.as_deref() == Some("Dog")
    }

    fn learn_to_speak(&mut self) -> CautionResult<Flow> {
        self.greeting.get_or_insert_with(|| "Woof".to_string());
        Ok(Flow::Continue)
    }

    fn warn_against_mute_pet(&mut self) -> CautionResult<()> {
        if self.greeting.as_deref().map_or(true, |g| g.trim().is_empty()) {
            self.warnings_mut().add("greeting", "Pet is too quiet")?;
        }
        Ok(())
    }

    fn warn_against_unborn_pet(&mut self) -> CautionResult<()> {
        let today = Utc::now().date_naive();
        if self.birthdate.is_some_and(|birthdate| birthdate > today) {
            self.warnings_mut()
                .add("birthdate", "Birth date is in the future")?;
        }
        Ok(())
    }

    fn warn_against_check_out_pet(&mut self) -> CautionResult<()> {
        if self.status.as_deref() == Some("out") {
            self.warnings_mut().add_active("status", "Pet is checking out")?;
        }
        Ok(())
    }

    fn freak_out_if_pet_can_talk(&mut self) -> CautionResult<()> {
        if self.greeting.as_deref() == Some("Hello there, friend!") {
            return Err(CautionError::Callback {
                name: "freak_out_if_pet_can_talk".to_string(),
                reason: "the pet can talk".to_string(),
            });
        }
        Ok(())
    }
}

fn declare_pet() -> CautionResult<CautionRegistry<Pet>> {
    let mut b = CautionRegistry::builder(ModelNaming::new("pet"), Arc::new(catalog()?));

    b.before_cautions(
        Callback::method("learn_to_speak", Pet::learn_to_speak),
        Conditions::new(),
    );

    b.caution(
        Callback::method("warn_against_mute_pet", Pet::warn_against_mute_pet),
        Conditions::new(),
    );
    b.caution(
        Callback::method("warn_against_unborn_pet", Pet::warn_against_unborn_pet),
        Conditions::new(),
    );
    b.caution(
        Callback::method("warn_against_check_out_pet", Pet::warn_against_check_out_pet),
        Conditions::new(),
    );

    RuleSet::from_toml_str(PET_RULES)?.apply(&mut b)?;

    b.after_cautions(
        Callback::method("freak_out_if_pet_can_talk", Pet::freak_out_if_pet_can_talk),
        Conditions::new(),
    );

    Ok(b.build())
}

fn declare_dog(pets: &CautionRegistry<Pet>) -> CautionResult<CautionRegistry<Pet>> {
    let mut b = pets.derive("dog");
    RuleSet::from_toml_str(DOG_RULES)?.apply(&mut b)?;
    Ok(b.build())
}

/// The cautions every pet runs.
///
/// # Panics
///
/// On first use if the declarations are invalid.
pub fn registry() -> &'static CautionRegistry<Pet> {
    static REGISTRY: OnceLock<CautionRegistry<Pet>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        declare_pet().unwrap_or_else(|e| panic!("Pet cautions are misconfigured: {e}"))
    })
}

/// The pet cautions plus the dog rules.
///
/// # Panics
///
/// On first use if the declarations are invalid.
pub fn dog_registry() -> &'static CautionRegistry<Pet> {
    static REGISTRY: OnceLock<CautionRegistry<Pet>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        declare_dog(registry()).unwrap_or_else(|e| panic!("Dog cautions are misconfigured: {e}"))
    })
}

impl Cautionable for Pet {
    fn cautions(&self) -> &'static CautionRegistry<Self> {
        if self.is_dog() {
            dog_registry()
        } else {
            registry()
        }
    }

    fn caution_state(&self) -> &CautionState {
        &self.state
    }

    fn caution_state_mut(&mut self) -> &mut CautionState {
        &mut self.state
    }

    fn read_attribute(&self, attribute: &Attribute) -> Value {
        match attribute.as_str() {
            "name" => self.name.clone().into(),
            "category" => self.category.clone().into(),
            "birthdate" => self.birthdate.map(|d| d.to_string()).into(),
            "description" => self.description.clone().into(),
            "status" => self.status.clone().into(),
            "greeting" => self.greeting.clone().into(),
            _ => Value::Null,
        }
    }
}

impl HostValidation for Pet {
    fn run_host_validations(&mut self, _context: Option<&Context>) -> bool {
        self.errors.clear();
        if value::is_blank(&self.read_attribute(&Attribute::new("name"))) {
            self.errors.add("name", "can't be blank");
        }
        self.errors.is_empty()
    }

    fn add_base_error(&mut self, message: String) {
        self.errors.add(Attribute::base(), message);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use caution_contracts::SafetyState;
    use caution_core::WarningMap;

    use super::*;

    fn next_month() -> NaiveDate {
        Utc::now().date_naive() + Duration::days(31)
    }

    fn map(entries: &[(&str, &str)]) -> WarningMap<String> {
        let mut map = WarningMap::new();
        for (attribute, message) in entries {
            map.push(Attribute::new(*attribute), message.to_string());
        }
        map
    }

    fn ben_checking_out() -> CautionResult<Pet> {
        Pet::create(Pet::named("Ben").with_birthdate(next_month()).with_status("out"))
    }

    // ── Callbacks ────────────────────────────────────────────────────────────

    #[test]
    fn before_callback_teaches_the_pet_to_speak() {
        let mut pet = Pet::new();
        assert_eq!(pet.greeting, None);
        pet.is_safe(None).unwrap();
        assert!(!pet.warnings().get("greeting").contains(&"Pet is too quiet".to_string()));
        assert_eq!(pet.greeting.as_deref(), Some("Woof"));
    }

    #[test]
    fn after_callback_error_aborts_the_run() {
        let mut pet = Pet::new().with_greeting("Hello there, friend!");
        let err = pet.is_safe(None).unwrap_err();
        assert!(
            matches!(err, CautionError::Callback { ref name, .. } if name == "freak_out_if_pet_can_talk")
        );
    }

    // ── Rules from TOML ──────────────────────────────────────────────────────

    #[test]
    fn safe_pet_without_any_warnings() {
        let mut pet = Pet::create(
            Pet::named("Baileys")
                .with_category("Dog")
                .with_birthdate(NaiveDate::from_ymd_opt(2011, 11, 3).unwrap())
                .with_description("Warren")
                .with_status("in"),
        )
        .unwrap();

        assert_eq!(pet.name.as_deref(), Some("Baileys"));
        assert!(pet.is_persisted());
        assert!(pet.is_safe(None).unwrap());
        assert!(!pet.is_unsafe(None).unwrap());
    }

    #[test]
    fn empty_greeting_is_blank() {
        let mut pet = Pet::new().with_greeting("");
        pet.is_safe(None).unwrap();
        assert!(pet.warnings().get("greeting").contains(&"can't be blank".to_string()));

        pet.greeting = Some("woof woof!".to_string());
        pet.is_safe(None).unwrap();
        assert!(!pet.warnings().get("greeting").contains(&"can't be blank".to_string()));
    }

    #[test]
    fn names_cannot_contain_numbers() {
        let mut pet = Pet::named("K9");
        pet.is_safe(None).unwrap();
        assert!(pet.warnings().get("name").contains(&"can't contain numbers".to_string()));

        pet.name = Some("Kay Nine".to_string());
        pet.is_safe(None).unwrap();
        assert!(!pet.warnings().get("name").contains(&"can't contain numbers".to_string()));
    }

    #[test]
    fn dogs_run_the_derived_rules() {
        let mut dog = Pet::named("Rex").with_category("Dog").with_greeting("Meow");
        assert!(!dog.is_safe(None).unwrap());
        assert_eq!(
            dog.warnings().full_messages(),
            vec!["Greeting is not something a dog would say".to_string()]
        );

        let mut cat = Pet::named("Tom").with_category("Cat").with_greeting("Meow");
        assert!(cat.is_safe(None).unwrap());
    }

    #[test]
    fn becoming_a_dog_switches_to_dog_messages() {
        let mut pet = Pet::named("Rex").with_greeting("Meow");
        assert!(pet.is_safe(None).unwrap());
        assert!(pet.warnings().is_empty());

        pet.category = Some("Dog".to_string());
        assert!(!pet.is_safe(None).unwrap());
        assert_eq!(
            pet.warnings().get("greeting"),
            ["is not something a dog would say".to_string()]
        );
    }

    // ── Passive and active warnings ──────────────────────────────────────────

    #[test]
    fn future_birthdate_is_a_passive_warning() {
        let mut pet = Pet::create(Pet::named("Ben").with_birthdate(next_month())).unwrap();
        assert!(pet.is_persisted());
        assert!(!pet.is_safe(None).unwrap());
        assert!(!pet.warnings().is_empty());
        assert_eq!(pet.warnings().size(), 1);
        assert_eq!(pet.warnings().count(), 1);
        assert_eq!(
            pet.warnings().get("birthdate"),
            ["Birth date is in the future".to_string()]
        );
        assert_eq!(
            *pet.warnings().messages(),
            map(&[("birthdate", "Birth date is in the future")])
        );
        assert!(pet.warnings().active().is_empty());
    }

    #[test]
    fn checking_out_is_an_active_warning() {
        let mut pet = Pet::create(Pet::named("Ben").with_status("out")).unwrap();
        assert!(!pet.is_safe(None).unwrap());
        let checking_out = map(&[("status", "Pet is checking out")]);
        assert_eq!(*pet.warnings().messages(), checking_out);
        assert_eq!(*pet.warnings().active(), checking_out);
        assert_eq!(pet.warnings().size(), 1);

        pet.warnings_mut()
            .add_active("status", "Pet is still out")
            .unwrap();
        let both = map(&[("status", "Pet is checking out"), ("status", "Pet is still out")]);
        assert_eq!(*pet.warnings().messages(), both);
        assert_eq!(*pet.warnings().active(), both);
        assert_eq!(pet.warnings().size(), 2);
    }

    #[test]
    fn passive_and_active_side_by_side() {
        let mut pet = ben_checking_out().unwrap();
        assert!(!pet.is_safe(None).unwrap());
        assert_eq!(
            *pet.warnings().active(),
            map(&[("status", "Pet is checking out")])
        );
        assert_eq!(
            *pet.warnings().messages(),
            map(&[
                ("birthdate", "Birth date is in the future"),
                ("status", "Pet is checking out"),
            ])
        );
        assert_eq!(pet.warnings().size(), 2);

        pet.warnings_mut()
            .add_active("status", "Pet is still out")
            .unwrap();
        assert_eq!(pet.warnings().size(), 3);
    }

    #[test]
    fn passive_is_what_is_not_active() {
        let mut pet = ben_checking_out().unwrap();
        assert!(pet.is_unsafe(None).unwrap());

        assert!(pet.warnings().active().get("birthdate").is_empty());
        assert_eq!(
            pet.warnings().passive(),
            map(&[("birthdate", "Birth date is in the future")])
        );
        assert_eq!(pet.warnings().messages().len(), 2);
    }

    #[test]
    fn active_messages_are_full_messages() {
        let mut pet = ben_checking_out().unwrap();
        pet.is_safe(None).unwrap();
        assert_eq!(
            pet.warnings().active_messages(),
            vec!["Status Pet is checking out".to_string()]
        );
        assert_eq!(
            pet.warnings().full_messages(),
            vec![
                "Birthdate Birth date is in the future".to_string(),
                "Status Pet is checking out".to_string(),
            ]
        );
    }

    #[test]
    fn clear_removes_everything() {
        let mut pet = ben_checking_out().unwrap();
        assert!(!pet.is_safe(None).unwrap());

        pet.warnings_mut().clear();
        assert_eq!(pet.warnings().size(), 0);
        assert!(pet.warnings().messages().is_empty());
        assert!(pet.warnings().active().is_empty());
        assert!(pet.warnings().is_empty());
    }

    // ── Confirmation gate ────────────────────────────────────────────────────

    #[test]
    fn unconfirmed_active_warnings_fail_validation() {
        let mut pet = ben_checking_out().unwrap();
        assert!(!pet.is_persisted());
        assert!(pet.is_unsafe(None).unwrap());
        assert!(!pet.warnings().active().is_empty());

        assert!(pet.is_invalid(None).unwrap());
        assert!(pet
            .errors()
            .base()
            .contains(&"The following warnings need confirmation: Status Pet is checking out".to_string()));
        assert!(!pet.errors().base().iter().any(|e| e.contains("in the future")));
        assert!(pet.warnings_need_confirmation());
        assert_eq!(pet.safety_state(), SafetyState::UnconfirmedActive);
    }

    #[test]
    fn accepted_warnings_let_validation_pass() {
        let mut pet = Pet::create(Pet::named("Ben").with_status("out")).unwrap();
        assert!(pet.is_unsafe(None).unwrap());
        assert!(pet.is_invalid(None).unwrap());
        assert!(!pet.errors().base().is_empty());
        assert!(pet.warnings_need_confirmation());

        assert!(!pet.confirmed_safe());
        pet.set_confirm_decision(true);
        assert!(!pet.warnings_need_confirmation());
        assert!(pet.confirmed_safe());

        assert!(pet.is_unsafe(None).unwrap());
        assert!(pet.is_valid(None).unwrap());
        assert_eq!(pet.safety_state(), SafetyState::ConfirmedAccepted);
    }

    #[test]
    fn rejected_warnings_keep_the_record_invalid() {
        let mut pet = Pet::create(Pet::named("Ben").with_status("out")).unwrap();
        assert!(pet.is_unsafe(None).unwrap());
        assert!(pet.is_invalid(None).unwrap());
        assert!(pet.warnings_need_confirmation());

        assert!(!pet.confirmed_safe());
        pet.set_confirm_decision(false);
        assert!(!pet.warnings_need_confirmation());
        assert!(!pet.confirmed_safe());
        assert_eq!(pet.safety_state(), SafetyState::ConfirmedRejected);

        assert!(pet.is_unsafe(None).unwrap());
        assert!(pet.is_invalid(None).unwrap());
    }

    #[test]
    fn gate_can_be_suspended_for_one_check() {
        let mut pet = Pet::named("Ben")
            .with_birthdate(next_month())
            .with_status("out");
        assert!(pet.is_unsafe(None).unwrap());
        assert!(!pet.warnings().active().is_empty());

        assert!(pet.valid_ignoring_unconfirmed_active_warnings(None).unwrap());
        assert!(pet.errors().base().is_empty());
        assert!(!pet.warnings_need_confirmation());
        assert_eq!(pet.warnings().size(), 2);
    }

    #[test]
    fn save_succeeds_once_confirmed() {
        let mut pet = Pet::named("Ben").with_status("out");
        assert!(!pet.save().unwrap());
        assert!(!pet.is_persisted());

        pet.set_confirm_decision(true);
        assert!(pet.save().unwrap());
        assert!(pet.is_persisted());
    }

    // ── Host validation ──────────────────────────────────────────────────────

    #[test]
    fn host_errors_stop_before_cautions() {
        let mut pet = Pet::new().with_status("out");
        assert!(!pet.save().unwrap());
        assert_eq!(pet.errors().get("name"), ["can't be blank".to_string()]);
        assert!(pet.errors().base().is_empty());
        assert!(!pet.warnings_need_confirmation());
    }
}
