//! Fixtures shared by this crate's unit tests.

use std::{collections::HashMap, sync::Arc};

use serde_json::{Map, Value};

use caution_contracts::{CautionError, CautionResult, Context, ModelNaming};

use crate::{
    registry::{CautionRegistry, RegistryBuilder},
    render::MessageRenderer,
    state::CautionState,
    traits::{Cautionable, HostValidation},
    warnings::AddOptions,
};

const MESSAGES: &[(&str, &str)] = &[
    ("warnings.format", "%{attribute} %{message}"),
    ("warnings.messages.invalid", "is invalid"),
    ("warnings.messages.blank", "can't be blank"),
    ("warnings.messages.inclusion", "is not included in the list"),
    ("warnings.messages.less_than", "must be less than %{count}"),
    (
        "warnings.messages.need_confirmation",
        "The following warnings need confirmation: %{warnings}",
    ),
];

pub(crate) fn catalog(extra: &[(&str, &str)]) -> HashMap<String, String> {
    MESSAGES
        .iter()
        .chain(extra)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub(crate) fn renderer(model: &str) -> Arc<MessageRenderer> {
    renderer_with(ModelNaming::new(model), &[])
}

pub(crate) fn renderer_with(naming: ModelNaming, extra: &[(&str, &str)]) -> Arc<MessageRenderer> {
    Arc::new(MessageRenderer::new(naming, Arc::new(catalog(extra))))
}

pub(crate) fn builder(model: &str) -> RegistryBuilder<Sample> {
    CautionRegistry::builder(ModelNaming::new(model), Arc::new(catalog(&[])))
}

/// Registries live for the whole program in real hosts; tests leak theirs.
pub(crate) fn leak(builder: RegistryBuilder<Sample>) -> &'static CautionRegistry<Sample> {
    Box::leak(Box::new(builder.build()))
}

pub(crate) fn empty_registry() -> &'static CautionRegistry<Sample> {
    leak(builder("sample"))
}

/// A host record backed by a JSON object.
pub(crate) struct Sample {
    attrs: Map<String, Value>,
    raw: Option<Map<String, Value>>,
    pub(crate) registry: &'static CautionRegistry<Sample>,
    state: CautionState,
    pub(crate) errors: Vec<String>,
    pub(crate) host_valid: bool,
    /// `(attribute, message, active)` added by the host's own validation.
    pub(crate) host_warning: Option<(String, String, bool)>,
}

impl Sample {
    pub(crate) fn new(registry: &'static CautionRegistry<Sample>) -> Self {
        Self {
            attrs: Map::new(),
            raw: None,
            registry,
            state: CautionState::new(),
            errors: Vec::new(),
            host_valid: true,
            host_warning: None,
        }
    }

    pub(crate) fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub(crate) fn with_raw(mut self, raw: Map<String, Value>) -> Self {
        self.raw = Some(raw);
        self
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) {
        self.attrs.insert(name.to_string(), value);
    }

    pub(crate) fn attr(&self, name: &str) -> Value {
        self.attrs.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl Cautionable for Sample {
    fn cautions(&self) -> &'static CautionRegistry<Self> {
        self.registry
    }

    fn caution_state(&self) -> &CautionState {
        &self.state
    }

    fn caution_state_mut(&mut self) -> &mut CautionState {
        &mut self.state
    }

    fn read_attribute(&self, attribute: &caution_contracts::Attribute) -> Value {
        self.attr(attribute.as_str())
    }

    fn raw_payload(&self) -> CautionResult<Option<&Map<String, Value>>> {
        match &self.raw {
            Some(raw) => Ok(Some(raw)),
            None => Err(CautionError::Unsupported {
                operation: "raw payload extraction: no rawtext available".to_string(),
            }),
        }
    }
}

impl HostValidation for Sample {
    fn run_host_validations(&mut self, _context: Option<&Context>) -> bool {
        self.errors.clear();
        if let Some((attribute, message, active)) = self.host_warning.clone() {
            let options = AddOptions::default().active(active);
            if self.warnings_mut().add_with(attribute, message, options).is_err() {
                return false;
            }
        }
        self.host_valid
    }

    fn add_base_error(&mut self, message: String) {
        self.errors.push(message);
    }
}
