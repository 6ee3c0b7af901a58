//! Presence: warn when a value is blank.

use serde_json::Value;

use caution_contracts::{value, Attribute, CautionResult, Message};
use caution_core::{CautionOptions, Cautionable, EachCheck};

#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceCheck;

impl<R: Cautionable> EachCheck<R> for PresenceCheck {
    fn kind(&self) -> &str {
        "presence"
    }

    fn caution_each(
        &self,
        record: &mut R,
        attribute: &Attribute,
        value: &Value,
        options: &CautionOptions<R>,
    ) -> CautionResult<()> {
        if value::is_blank(value) {
            record.warnings_mut().add_with(
                attribute,
                Message::key("blank"),
                options.add_options(value.clone()),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use caution_core::{CautionOptions, Cautionable};

    use crate::{
        testing::{registry, Record},
        RuleDsl,
    };

    #[test]
    fn blank_values_are_flagged() {
        let registry = registry("pet", |b| {
            b.cautions_presence_of(["greeting"], CautionOptions::new())?;
            Ok(())
        });

        for blank in [json!(null), json!(""), json!("   "), json!([])] {
            let mut record = Record::new(registry).with("greeting", blank);
            assert!(!record.is_safe(None).unwrap());
            assert_eq!(record.warnings().get("greeting"), ["can't be blank".to_string()]);
            assert!(record.warnings().added("greeting", "blank"));
        }

        let mut record = Record::new(registry).with("greeting", json!("Woof"));
        assert!(record.is_safe(None).unwrap());
    }

    #[test]
    fn custom_message_replaces_the_default() {
        let registry = registry("pet", |b| {
            b.cautions_presence_of(["greeting"], CautionOptions::new().message("Pet is too quiet"))?;
            Ok(())
        });
        let mut record = Record::new(registry);
        record.is_safe(None).unwrap();
        assert_eq!(record.warnings().full_messages(), vec!["Greeting Pet is too quiet".to_string()]);
    }
}
