//! Fixtures shared by this crate's unit tests.

use std::sync::Arc;

use serde_json::{Map, Value};

use caution_contracts::{Attribute, CautionResult, ModelNaming};
use caution_core::{CautionRegistry, CautionState, Cautionable, RegistryBuilder};
use caution_i18n::MessageCatalog;

pub(crate) fn builder(model: &str) -> RegistryBuilder<Record> {
    CautionRegistry::builder(ModelNaming::new(model), Arc::new(MessageCatalog::english()))
}

/// Build and leak a registry; declarations are expected to be valid.
pub(crate) fn registry(
    model: &str,
    declare: impl FnOnce(&mut RegistryBuilder<Record>) -> CautionResult<()>,
) -> &'static CautionRegistry<Record> {
    let mut b = builder(model);
    declare(&mut b).expect("test declarations are valid");
    Box::leak(Box::new(b.build()))
}

/// A host record backed by JSON objects for cast and raw values.
pub(crate) struct Record {
    attrs: Map<String, Value>,
    before_cast: Map<String, Value>,
    registry: &'static CautionRegistry<Record>,
    state: CautionState,
}

impl Record {
    pub(crate) fn new(registry: &'static CautionRegistry<Record>) -> Self {
        Self {
            attrs: Map::new(),
            before_cast: Map::new(),
            registry,
            state: CautionState::new(),
        }
    }

    pub(crate) fn with(mut self, name: &str, value: Value) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub(crate) fn with_before_type_cast(mut self, name: &str, value: Value) -> Self {
        self.before_cast.insert(name.to_string(), value);
        self
    }

    pub(crate) fn attr(&self, name: &str) -> Value {
        self.attrs.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl Cautionable for Record {
    fn cautions(&self) -> &'static CautionRegistry<Self> {
        self.registry
    }

    fn caution_state(&self) -> &CautionState {
        &self.state
    }

    fn caution_state_mut(&mut self) -> &mut CautionState {
        &mut self.state
    }

    fn read_attribute(&self, attribute: &Attribute) -> Value {
        self.attr(attribute.as_str())
    }

    fn read_attribute_before_type_cast(&self, attribute: &Attribute) -> Option<Value> {
        self.before_cast.get(attribute.as_str()).cloned()
    }
}
