//! The host's own error collection.

use serde::Serialize;

use caution_contracts::Attribute;
use caution_core::WarningMap;

/// Validation errors keyed by attribute, kept apart from warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HostErrors {
    entries: WarningMap<String>,
}

impl HostErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<Attribute>, message: impl Into<String>) {
        self.entries.push(attribute.into(), message.into());
    }

    pub fn get(&self, attribute: &str) -> &[String] {
        self.entries.get(attribute)
    }

    /// Record-level errors.
    pub fn base(&self) -> &[String] {
        self.entries.get(Attribute::BASE)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_errors_are_kept_apart() {
        let mut errors = HostErrors::new();
        errors.add("name", "can't be blank");
        errors.add(Attribute::base(), "needs confirmation");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.base(), ["needs confirmation".to_string()]);
        assert_eq!(errors.get("name"), ["can't be blank".to_string()]);

        errors.clear();
        assert!(errors.is_empty());
        assert!(errors.base().is_empty());
    }
}
