//! # caution-ref-pets
//!
//! Reference host records for the caution engine.
//!
//! Two models show the two ways a host wires cautions in:
//!
//! - **`Person`** is a plain record. It declares its rules in code and only
//!   ever asks `is_safe`.
//! - **`Pet`** is a persisted record with its own validation. Part of its
//!   rules come from `rules/pet.toml`, it runs before/after callbacks, and
//!   its active warnings gate `save` until someone confirms them. Dogs use a
//!   registry derived from the pet registry.
//!
//! `scenarios` walks through both from the demo CLI. All data is made up.

pub mod errors;
pub mod person;
pub mod pet;
pub mod scenarios;

use caution_contracts::CautionResult;
use caution_i18n::MessageCatalog;

const MESSAGES: &str = include_str!("../locales/en.toml");

/// The bundled English defaults with this crate's model messages on top.
pub fn catalog() -> CautionResult<MessageCatalog> {
    let models = MessageCatalog::from_toml_str("en", MESSAGES)?;
    Ok(MessageCatalog::english().merge(models))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_messages_layer_over_the_defaults() {
        let catalog = catalog().unwrap();
        assert_eq!(
            catalog.get("activemodel.attributes.person.likes_scooby_snacks"),
            Some("Likes Scooby Snacks")
        );
        assert_eq!(catalog.get("warnings.messages.blank"), Some("can't be blank"));
    }
}
