//! The warning store: an ordered, per-attribute collection of rendered
//! warning messages with parallel structured details and an active subset.
//!
//! Mirrors the shape of a host's error collection so the two read alike, but
//! is never consulted by the host's validity check directly.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use caution_contracts::{Attribute, CautionError, CautionResult, Message, WarningDetail};

use crate::render::MessageRenderer;

// ── WarningMap ───────────────────────────────────────────────────────────────

/// An insertion-ordered multimap from attribute to entries.
///
/// Reading an attribute that was never written yields an empty slice and
/// does not create a bucket. Equality ignores attribute order.
#[derive(Debug, Clone)]
pub struct WarningMap<T> {
    entries: Vec<(Attribute, Vec<T>)>,
}

impl<T> Default for WarningMap<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> WarningMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: impl AsRef<str>) -> &[T] {
        let attribute = attribute.as_ref();
        self.entries
            .iter()
            .find(|(a, _)| a.as_str() == attribute)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, attribute: impl AsRef<str>) -> bool {
        !self.get(attribute).is_empty()
    }

    pub fn push(&mut self, attribute: Attribute, item: T) {
        match self.entries.iter_mut().find(|(a, _)| *a == attribute) {
            Some((_, items)) => items.push(item),
            None => self.entries.push((attribute, vec![item])),
        }
    }

    /// Remove the bucket for `attribute`, returning its entries.
    pub fn remove(&mut self, attribute: impl AsRef<str>) -> Vec<T> {
        let attribute = attribute.as_ref();
        match self.entries.iter().position(|(a, _)| a.as_str() == attribute) {
            Some(index) => self.entries.remove(index).1,
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, items)| items.is_empty())
    }

    /// Total number of entries across all attributes.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Attribute> {
        self.iter().map(|(attribute, _)| attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Attribute, &[T])> {
        self.entries
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(attribute, items)| (attribute, items.as_slice()))
    }

    /// Every entry paired with its attribute, in insertion order.
    pub fn flat_iter(&self) -> impl Iterator<Item = (&Attribute, &T)> {
        self.iter()
            .flat_map(|(attribute, items)| items.iter().map(move |item| (attribute, item)))
    }
}

impl<T: PartialEq> PartialEq for WarningMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().count() == other.iter().count()
            && self.iter().all(|(attribute, items)| other.get(attribute) == items)
    }
}

impl<T: Serialize> Serialize for WarningMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.iter().count()))?;
        for (attribute, items) in self.iter() {
            map.serialize_entry(attribute, items)?;
        }
        map.end()
    }
}

impl<A: Into<Attribute>, T> FromIterator<(A, Vec<T>)> for WarningMap<T> {
    fn from_iter<I: IntoIterator<Item = (A, Vec<T>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (attribute, items) in iter {
            let attribute = attribute.into();
            for item in items {
                map.push(attribute.clone(), item);
            }
        }
        map
    }
}

// ── AddOptions ───────────────────────────────────────────────────────────────

/// Per-call options for `WarningStore::add_with`.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Also record the message in the active subset.
    pub active: bool,
    /// Fail immediately with `CautionError::StrictWarning` instead of storing.
    pub strict: bool,
    /// Override the rendered message: a key replaces the kind, text or a
    /// lazy producer becomes the template.
    pub message: Option<Message>,
    /// The offending value, available as `%{value}` and kept in the details.
    pub value: Value,
    /// Extra `%{name}` values, kept in the details too.
    pub interpolations: BTreeMap<String, Value>,
}

impl AddOptions {
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub fn interpolate(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.interpolations.insert(name.into(), value.into());
        self
    }
}

// ── WarningStore ─────────────────────────────────────────────────────────────

/// The warnings of one record.
///
/// Three parallel maps are kept per attribute: rendered `messages`,
/// structured `details` (same order as the messages), and the `active`
/// subset. Every active message is also present in `messages`.
#[derive(Clone)]
pub struct WarningStore {
    renderer: Arc<MessageRenderer>,
    messages: WarningMap<String>,
    details: WarningMap<WarningDetail>,
    active: WarningMap<String>,
}

impl fmt::Debug for WarningStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningStore")
            .field("messages", &self.messages)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl WarningStore {
    pub fn new(renderer: Arc<MessageRenderer>) -> Self {
        Self {
            renderer,
            messages: WarningMap::new(),
            details: WarningMap::new(),
            active: WarningMap::new(),
        }
    }

    pub fn renderer(&self) -> &MessageRenderer {
        &self.renderer
    }

    /// Render future warnings with `renderer`. Stored messages keep the text
    /// they were rendered with.
    pub fn rebind(&mut self, renderer: Arc<MessageRenderer>) {
        self.renderer = renderer;
    }

    /// Add a passive warning.
    pub fn add(
        &mut self,
        attribute: impl Into<Attribute>,
        message: impl Into<Message>,
    ) -> CautionResult<()> {
        self.add_with(attribute, message, AddOptions::default())
    }

    /// Add a warning that must be confirmed before the record is valid.
    pub fn add_active(
        &mut self,
        attribute: impl Into<Attribute>,
        message: impl Into<Message>,
    ) -> CautionResult<()> {
        self.add_with(attribute, message, AddOptions::default().active(true))
    }

    pub fn add_with(
        &mut self,
        attribute: impl Into<Attribute>,
        message: impl Into<Message>,
        options: AddOptions,
    ) -> CautionResult<()> {
        let attribute = attribute.into();
        let (kind, text) = match message.into() {
            Message::Key(kind) => {
                let text = self.renderer.generate_message(&attribute, &kind, &options);
                (kind, text)
            }
            Message::Text(text) => (text.clone(), text),
            Message::Lazy(f) => {
                let text = f();
                (text.clone(), text)
            }
        };

        if options.strict {
            let message = self.renderer.full_message(&attribute, &text);
            warn!(attribute = %attribute, message = %message, "strict caution raised");
            return Err(CautionError::StrictWarning {
                attribute: attribute.to_string(),
                message,
            });
        }

        let mut detail = WarningDetail::new(kind);
        if !options.value.is_null() {
            detail.options.insert("value".to_string(), options.value);
        }
        detail.options.extend(options.interpolations);

        debug!(
            attribute = %attribute,
            kind = %detail.kind,
            active = options.active,
            "warning added"
        );
        if options.active {
            self.active.push(attribute.clone(), text.clone());
        }
        self.details.push(attribute.clone(), detail);
        self.messages.push(attribute, text);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.details.clear();
        self.active.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &WarningMap<String> {
        &self.messages
    }

    pub fn details(&self) -> &WarningMap<WarningDetail> {
        &self.details
    }

    pub fn active(&self) -> &WarningMap<String> {
        &self.active
    }

    /// Messages of `attribute`, empty if it has none.
    pub fn get(&self, attribute: impl AsRef<str>) -> &[String] {
        self.messages.get(attribute)
    }

    pub fn include(&self, attribute: impl AsRef<str>) -> bool {
        self.messages.contains(attribute)
    }

    /// Was a warning of `kind` added on `attribute`?
    pub fn added(&self, attribute: impl AsRef<str>, kind: &str) -> bool {
        self.details
            .get(attribute)
            .iter()
            .any(|detail| detail.kind == kind)
    }

    /// Remove `attribute` from messages, details, and the active subset.
    pub fn delete(&mut self, attribute: impl AsRef<str>) -> Vec<String> {
        let attribute = attribute.as_ref();
        self.details.remove(attribute);
        self.active.remove(attribute);
        self.messages.remove(attribute)
    }

    pub fn keys(&self) -> Vec<&Attribute> {
        self.messages.keys().collect()
    }

    pub fn values(&self) -> Vec<&[String]> {
        self.messages.iter().map(|(_, items)| items).collect()
    }

    /// Total number of messages.
    pub fn size(&self) -> usize {
        self.messages.len()
    }

    pub fn count(&self) -> usize {
        self.size()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Attribute, &String)> {
        self.messages.flat_iter()
    }

    /// Messages of `attribute` paired with whether each one is active.
    ///
    /// Counts matter: if a text was added twice but activated once, only one
    /// of the two is flagged.
    fn flagged(&self, attribute: &Attribute) -> Vec<(&String, bool)> {
        let mut remaining: Vec<&String> = self.active.get(attribute).iter().collect();
        self.messages
            .get(attribute)
            .iter()
            .map(|message| match remaining.iter().position(|a| *a == message) {
                Some(index) => {
                    remaining.swap_remove(index);
                    (message, true)
                }
                None => (message, false),
            })
            .collect()
    }

    /// Messages that are not active, per attribute. Attributes left with no
    /// passive messages are omitted.
    pub fn passive(&self) -> WarningMap<String> {
        let mut passive = WarningMap::new();
        for attribute in self.messages.keys() {
            for (message, active) in self.flagged(attribute) {
                if !active {
                    passive.push(attribute.clone(), message.clone());
                }
            }
        }
        passive
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.messages
            .flat_iter()
            .map(|(attribute, message)| self.renderer.full_message(attribute, message))
            .collect()
    }

    pub fn to_a(&self) -> Vec<String> {
        self.full_messages()
    }

    pub fn full_messages_for(&self, attribute: impl AsRef<str>) -> Vec<String> {
        let attribute = Attribute::new(attribute.as_ref());
        self.messages
            .get(&attribute)
            .iter()
            .map(|message| self.renderer.full_message(&attribute, message))
            .collect()
    }

    pub fn active_messages(&self) -> Vec<String> {
        self.active
            .flat_iter()
            .map(|(attribute, message)| self.renderer.full_message(attribute, message))
            .collect()
    }

    pub fn to_hash(&self) -> WarningMap<String> {
        self.messages.clone()
    }

    pub fn to_full_hash(&self) -> WarningMap<String> {
        let mut full = WarningMap::new();
        for (attribute, message) in self.messages.flat_iter() {
            full.push(attribute.clone(), self.renderer.full_message(attribute, message));
        }
        full
    }

    /// JSON object of attribute to messages, optionally full messages.
    pub fn to_json(&self, full: bool) -> Value {
        let source = if full { self.to_full_hash() } else { self.to_hash() };
        Value::Object(
            source
                .iter()
                .map(|(attribute, items)| (attribute.to_string(), Value::from(items.to_vec())))
                .collect(),
        )
    }

    /// Capture every warning with its detail and active flag, so they can be
    /// restored after a run that clears the store.
    pub fn preserve(&self) -> PreservedWarnings {
        let mut entries = Vec::new();
        for attribute in self.messages.keys() {
            let details = self.details.get(attribute);
            for (index, (message, active)) in self.flagged(attribute).into_iter().enumerate() {
                entries.push(PreservedWarning {
                    attribute: attribute.clone(),
                    message: message.clone(),
                    detail: details.get(index).cloned(),
                    active,
                });
            }
        }
        PreservedWarnings { entries }
    }

    /// Re-add preserved warnings whose text is not already present on their
    /// attribute. Returns how many were restored.
    pub fn reapply(&mut self, preserved: PreservedWarnings) -> usize {
        let mut restored = 0;
        for entry in preserved.entries {
            if self.messages.get(&entry.attribute).contains(&entry.message) {
                continue;
            }
            if entry.active {
                self.active.push(entry.attribute.clone(), entry.message.clone());
            }
            let detail = entry
                .detail
                .unwrap_or_else(|| WarningDetail::new(entry.message.clone()));
            self.details.push(entry.attribute.clone(), detail);
            self.messages.push(entry.attribute, entry.message);
            restored += 1;
        }
        restored
    }
}

/// A snapshot taken by `WarningStore::preserve`.
#[derive(Debug, Clone, Default)]
pub struct PreservedWarnings {
    entries: Vec<PreservedWarning>,
}

impl PreservedWarnings {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PreservedWarning {
    attribute: Attribute,
    message: String,
    detail: Option<WarningDetail>,
    active: bool,
}
